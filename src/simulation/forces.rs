// Individual forces. Each one adjusts particle velocities (centering adjusts
// positions directly) and is scaled by the current alpha where it applies.

use super::{SimulationLink, SimulationParticle};

/// Precomputed spring parameters for one link.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LinkSpring {
    source: usize,
    target: usize,
    distance: f64,
    /// Weaker on busy nodes so hubs don't get yanked around.
    strength: f64,
    /// Share of the correction applied to the target; the rest goes to the
    /// source. Favors moving the less connected end.
    bias: f64,
}

pub(super) fn springs(particle_count: usize, links: &[SimulationLink], distance: f64) -> Vec<LinkSpring> {
    let mut degree = vec![0usize; particle_count];
    for l in links {
        degree[l.source] += 1;
        degree[l.target] += 1;
    }
    links
        .iter()
        .map(|l| {
            let (ds, dt) = (degree[l.source] as f64, degree[l.target] as f64);
            LinkSpring {
                source: l.source,
                target: l.target,
                distance,
                strength: 1.0 / ds.min(dt),
                bias: ds / (ds + dt),
            }
        })
        .collect()
}

/// Deterministic tiny offsets used to pull apart particles that sit exactly on
/// top of each other. Linear congruential generator, same constants as
/// Numerical Recipes.
#[derive(Debug, Clone)]
pub(super) struct Jiggle {
    state: u64,
}

impl Default for Jiggle {
    fn default() -> Self {
        Jiggle { state: 1 }
    }
}

impl Jiggle {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    fn next_unit(&mut self) -> f64 {
        self.state = (Self::A * self.state + Self::C) % Self::M;
        self.state as f64 / Self::M as f64
    }

    pub(super) fn offset(&mut self) -> f64 {
        (self.next_unit() - 0.5) * 1e-6
    }

    fn or_offset(&mut self, v: f64) -> f64 {
        if v == 0.0 { self.offset() } else { v }
    }
}

/// Spring force toward each link's rest length.
pub(super) fn apply_links(
    particles: &mut [SimulationParticle],
    springs: &[LinkSpring],
    alpha: f64,
    jiggle: &mut Jiggle,
) {
    for s in springs {
        let (src, tgt) = (&particles[s.source], &particles[s.target]);
        let x = jiggle.or_offset(tgt.x + tgt.vx - src.x - src.vx);
        let y = jiggle.or_offset(tgt.y + tgt.vy - src.y - src.vy);
        let len = x.hypot(y);
        let k = (len - s.distance) / len * alpha * s.strength;
        let (x, y) = (x * k, y * k);

        let tgt = &mut particles[s.target];
        tgt.vx -= x * s.bias;
        tgt.vy -= y * s.bias;
        let src = &mut particles[s.source];
        src.vx += x * (1.0 - s.bias);
        src.vy += y * (1.0 - s.bias);
    }
}

/// Pairwise charge. Squared distances below 1 are softened so close pairs
/// don't blow up.
pub(super) fn apply_charge(
    particles: &mut [SimulationParticle],
    strength: f64,
    alpha: f64,
    jiggle: &mut Jiggle,
) {
    const DISTANCE_MIN2: f64 = 1.0;

    let positions: Vec<(f64, f64)> = particles.iter().map(|p| (p.x, p.y)).collect();
    for (i, p) in particles.iter_mut().enumerate() {
        for (j, &(ox, oy)) in positions.iter().enumerate() {
            if i == j {
                continue;
            }
            let mut x = ox - positions[i].0;
            let mut y = oy - positions[i].1;
            let mut l = x * x + y * y;
            if x == 0.0 {
                x = jiggle.offset();
                l += x * x;
            }
            if y == 0.0 {
                y = jiggle.offset();
                l += y * y;
            }
            if l < DISTANCE_MIN2 {
                l = (DISTANCE_MIN2 * l).sqrt();
            }
            let w = strength * alpha / l;
            p.vx += x * w;
            p.vy += y * w;
        }
    }
}

/// Translate everything so the centroid moves onto `center`.
pub(super) fn apply_centering(particles: &mut [SimulationParticle], center: (f64, f64), strength: f64) {
    if particles.is_empty() {
        return;
    }
    // running mean, so the sum of coordinates never has to fit in an f64
    let (mx, my) = particles
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(mx, my), (i, p)| {
            let k = (i + 1) as f64;
            (mx + (p.x - mx) / k, my + (p.y - my) / k)
        });
    let dx = (mx - center.0) * strength;
    let dy = (my - center.1) * strength;
    for p in particles.iter_mut() {
        p.x -= dx;
        p.y -= dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(id: &str, x: f64, y: f64) -> SimulationParticle {
        SimulationParticle::new(id, x, y)
    }

    #[test]
    fn test_spring_strength_and_bias_follow_degree() {
        let links = vec![
            SimulationLink { id: "0->1".into(), source: 0, target: 1 },
            SimulationLink { id: "0->2".into(), source: 0, target: 2 },
        ];
        let s = springs(3, &links, 100.0);
        assert_eq!(s[0].strength, 1.0);
        assert!((s[0].bias - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_stretched_spring_pulls_together() {
        let mut ps = vec![particle("a", 0.0, 0.0), particle("b", 300.0, 0.0)];
        let links = vec![SimulationLink { id: "a->b".into(), source: 0, target: 1 }];
        let s = springs(2, &links, 100.0);
        apply_links(&mut ps, &s, 1.0, &mut Jiggle::default());
        assert!(ps[0].vx > 0.0);
        assert!(ps[1].vx < 0.0);
        // equal degree splits the correction evenly
        assert!((ps[0].vx + ps[1].vx).abs() < 1e-12);
    }

    #[test]
    fn test_compressed_spring_pushes_apart() {
        let mut ps = vec![particle("a", 0.0, 0.0), particle("b", 10.0, 0.0)];
        let links = vec![SimulationLink { id: "a->b".into(), source: 0, target: 1 }];
        let s = springs(2, &links, 100.0);
        apply_links(&mut ps, &s, 1.0, &mut Jiggle::default());
        assert!(ps[0].vx < 0.0);
        assert!(ps[1].vx > 0.0);
    }

    #[test]
    fn test_negative_charge_repels() {
        let mut ps = vec![particle("a", 0.0, 0.0), particle("b", 10.0, 0.0)];
        apply_charge(&mut ps, -200.0, 1.0, &mut Jiggle::default());
        assert!(ps[0].vx < 0.0);
        assert!(ps[1].vx > 0.0);
        // 10 * -200 / 100
        assert!((ps[1].vx - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_charge_scales_with_alpha() {
        let mut hot = vec![particle("a", 0.0, 0.0), particle("b", 10.0, 0.0)];
        let mut cool = hot.clone();
        apply_charge(&mut hot, -200.0, 1.0, &mut Jiggle::default());
        apply_charge(&mut cool, -200.0, 0.5, &mut Jiggle::default());
        assert!((hot[1].vx - 2.0 * cool[1].vx).abs() < 1e-12);
    }

    #[test]
    fn test_centering_moves_centroid() {
        let mut ps = vec![particle("a", 0.0, 0.0), particle("b", 10.0, 20.0)];
        apply_centering(&mut ps, (100.0, 100.0), 1.0);
        let cx = (ps[0].x + ps[1].x) / 2.0;
        let cy = (ps[0].y + ps[1].y) / 2.0;
        assert!((cx - 100.0).abs() < 1e-12);
        assert!((cy - 100.0).abs() < 1e-12);
        // relative layout untouched
        assert!((ps[1].x - ps[0].x - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_centering_handles_coordinates_near_f64_max() {
        let mut ps = vec![
            particle("a", 1e308, -1e308),
            particle("b", 1.5e308, -1.5e308),
            particle("c", 1e308, -1e308),
        ];
        apply_centering(&mut ps, (0.0, 0.0), 1.0);
        assert!(ps.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        let cx = ps.iter().map(|p| p.x / 3.0).sum::<f64>();
        assert!(cx.abs() < 1e296, "cx = {cx}");
    }

    #[test]
    fn test_jiggle_is_small_and_repeatable() {
        let mut a = Jiggle::default();
        let mut b = Jiggle::default();
        for _ in 0..100 {
            let v = a.offset();
            assert_eq!(v, b.offset());
            assert!(v.abs() <= 5e-7);
        }
    }
}
