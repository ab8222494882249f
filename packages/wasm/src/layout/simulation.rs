//! CPU force simulation.
//!
//! A velocity-Verlet style integrator with the same alpha schedule and force
//! formulas as d3-force, so tuning constants carry over unchanged. Forces only
//! write velocities; positions move once per tick after every force ran.
//!
//! # Tick
//!
//! 1. `alpha += (alpha_target - alpha) * alpha_decay`
//! 2. Every force adds to the velocities, in registration order: links,
//!    many-body, x, y, collision, then same-layer repulsion.
//! 3. `v *= 1 - velocity_decay; p += v`
//!
//! The simulation stops itself once alpha drops below `alpha_min`.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::ForceTuning;

use super::forces::{ForceConfig, LinkForce};

/// Mutable position/velocity buffers, indexed by node slot.
pub struct Bodies<'a> {
    pub x: &'a mut [f32],
    pub y: &'a mut [f32],
    pub vx: &'a mut [f32],
    pub vy: &'a mut [f32],
}

impl<'a> Bodies<'a> {
    pub fn new(
        x: &'a mut [f32],
        y: &'a mut [f32],
        vx: &'a mut [f32],
        vy: &'a mut [f32],
    ) -> Self {
        Self { x, y, vx, vy }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A force contributing to node velocities once per tick.
pub trait Force {
    fn name(&self) -> &'static str;

    fn apply(&self, bodies: &mut Bodies<'_>, alpha: f32);
}

/// Tiny deterministic offset used when two points coincide.
#[inline]
fn jiggle(seed: usize) -> f32 {
    ((seed as f32 * 0.618_034).fract() - 0.5) * 1e-6
}

/// Springs along links, split between endpoints by their degree.
struct LinkSprings {
    links: Vec<LinkForce>,
    bias: Vec<f32>,
}

impl LinkSprings {
    fn new(links: &[LinkForce], node_count: usize) -> Self {
        let mut count = vec![0u32; node_count];
        for link in links {
            count[link.source.slot()] += 1;
            count[link.target.slot()] += 1;
        }
        let bias = links
            .iter()
            .map(|link| {
                let s = count[link.source.slot()] as f32;
                let t = count[link.target.slot()] as f32;
                s / (s + t)
            })
            .collect();
        Self {
            links: links.to_vec(),
            bias,
        }
    }
}

impl Force for LinkSprings {
    fn name(&self) -> &'static str {
        "link"
    }

    fn apply(&self, b: &mut Bodies<'_>, alpha: f32) {
        for (i, (link, &bias)) in self.links.iter().zip(&self.bias).enumerate() {
            let (s, t) = (link.source.slot(), link.target.slot());
            let mut dx = b.x[t] + b.vx[t] - b.x[s] - b.vx[s];
            let mut dy = b.y[t] + b.vy[t] - b.y[s] - b.vy[s];
            if dx == 0.0 {
                dx = jiggle(i);
            }
            if dy == 0.0 {
                dy = jiggle(i + 1);
            }
            let l = (dx * dx + dy * dy).sqrt();
            let k = (l - link.distance) / l * alpha * link.strength;
            dx *= k;
            dy *= k;
            b.vx[t] -= dx * bias;
            b.vy[t] -= dy * bias;
            b.vx[s] += dx * (1.0 - bias);
            b.vy[s] += dy * (1.0 - bias);
        }
    }
}

/// Pairwise charge between all nodes.
struct ManyBody {
    strengths: Vec<f32>,
}

impl Force for ManyBody {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&self, b: &mut Bodies<'_>, alpha: f32) {
        let n = self.strengths.len();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut dx = b.x[j] - b.x[i];
                let mut dy = b.y[j] - b.y[i];
                if dx == 0.0 {
                    dx = jiggle(i * n + j);
                }
                if dy == 0.0 {
                    dy = jiggle(j * n + i);
                }
                let mut l = dx * dx + dy * dy;
                if l < 1.0 {
                    l = l.sqrt();
                }
                let w = self.strengths[j] * alpha / l;
                b.vx[i] += dx * w;
                b.vy[i] += dy * w;
            }
        }
    }
}

/// Pull towards a fixed coordinate on one axis.
struct Position {
    axis: Axis,
    targets: Vec<f32>,
    strengths: Vec<f32>,
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Force for Position {
    fn name(&self) -> &'static str {
        match self.axis {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }

    fn apply(&self, b: &mut Bodies<'_>, alpha: f32) {
        let (pos, vel) = match self.axis {
            Axis::X => (&*b.x, &mut *b.vx),
            Axis::Y => (&*b.y, &mut *b.vy),
        };
        for (i, (&target, &strength)) in self.targets.iter().zip(&self.strengths).enumerate() {
            vel[i] += (target - pos[i]) * strength * alpha;
        }
    }
}

/// Pushes overlapping circles apart, using predicted positions.
struct Collide {
    radii: Vec<f32>,
}

impl Force for Collide {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn apply(&self, b: &mut Bodies<'_>, _alpha: f32) {
        let n = self.radii.len();
        for i in 0..n {
            let ri = self.radii[i];
            let ri2 = ri * ri;
            let xi = b.x[i] + b.vx[i];
            let yi = b.y[i] + b.vy[i];
            for j in (i + 1)..n {
                let rj = self.radii[j];
                let r = ri + rj;
                let mut dx = xi - (b.x[j] + b.vx[j]);
                let mut dy = yi - (b.y[j] + b.vy[j]);
                let mut l = dx * dx + dy * dy;
                if l >= r * r {
                    continue;
                }
                if dx == 0.0 {
                    dx = jiggle(i * n + j);
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = jiggle(j * n + i);
                    l += dy * dy;
                }
                let l = l.sqrt();
                let k = (r - l) / l;
                dx *= k;
                dy *= k;
                let rj2 = rj * rj;
                let share = rj2 / (ri2 + rj2);
                b.vx[i] += dx * share;
                b.vy[i] += dy * share;
                b.vx[j] -= dx * (1.0 - share);
                b.vy[j] -= dy * (1.0 - share);
            }
        }
    }
}

/// Spreads connected, revealed nodes of the same layer apart.
///
/// Pairs closer than `threshold` get opposite velocity kicks proportional to
/// `(threshold - distance) / distance`. Each ordered pair kicks once, so
/// every node of an unordered pair is pushed twice per tick. Independent of
/// alpha, so it keeps acting while the rest of the layout cools down.
pub struct SameLayerRepulsion {
    /// Member slots per layer.
    layers: Vec<Vec<usize>>,
    threshold: f32,
    gain: f32,
}

impl SameLayerRepulsion {
    pub fn new(config: &ForceConfig, tuning: &ForceTuning) -> Self {
        let mut by_group: HashMap<u32, Vec<usize>> = HashMap::new();
        for (slot, node) in config.nodes.iter().enumerate() {
            if node.repels_same_layer {
                by_group.entry(node.group).or_default().push(slot);
            }
        }
        let mut layers: Vec<_> = by_group.into_iter().collect();
        layers.sort_unstable_by_key(|(group, _)| *group);
        Self {
            layers: layers.into_iter().map(|(_, members)| members).collect(),
            threshold: tuning.same_layer_threshold,
            gain: tuning.same_layer_gain,
        }
    }
}

impl Force for SameLayerRepulsion {
    fn name(&self) -> &'static str {
        "sameLayerRepulsion"
    }

    fn apply(&self, b: &mut Bodies<'_>, _alpha: f32) {
        for members in &self.layers {
            for (k, &a) in members.iter().enumerate() {
                for &c in &members[k + 1..] {
                    let mut dx = b.x[c] - b.x[a];
                    let mut dy = b.y[c] - b.y[a];
                    let mut distance = (dx * dx + dy * dy).sqrt();
                    if distance >= self.threshold {
                        continue;
                    }
                    if distance < f32::EPSILON {
                        dx = jiggle(a);
                        dy = jiggle(c + 1);
                        distance = (dx * dx + dy * dy).sqrt();
                    }
                    // (a, c) and (c, a) see the same distance
                    let push = 2.0 * (self.threshold - distance) / distance * self.gain;
                    let fx = dx * push;
                    let fy = dy * push;
                    b.vx[a] -= fx;
                    b.vy[a] -= fy;
                    b.vx[c] += fx;
                    b.vy[c] += fy;
                }
            }
        }
    }
}

/// Alpha-scheduled force simulation over a set of bodies.
pub struct Simulation {
    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,
    running: bool,
    node_count: usize,
    forces: Vec<Box<dyn Force>>,
    ticks: u32,
}

impl Simulation {
    /// A stopped simulation with no forces.
    pub fn new(tuning: &ForceTuning) -> Self {
        Self {
            alpha: 1.0,
            alpha_min: tuning.alpha_min,
            alpha_decay: tuning.alpha_decay(),
            alpha_target: 0.0,
            velocity_decay: tuning.velocity_decay,
            running: false,
            node_count: 0,
            forces: Vec::new(),
            ticks: 0,
        }
    }

    /// Replace every force with ones built from `config`.
    pub fn configure(&mut self, config: &ForceConfig, tuning: &ForceTuning) {
        let nodes = &config.nodes;
        self.node_count = nodes.len();
        self.alpha_min = tuning.alpha_min;
        self.alpha_decay = tuning.alpha_decay();
        self.velocity_decay = tuning.velocity_decay;
        self.forces = vec![
            Box::new(LinkSprings::new(&config.links, nodes.len())) as Box<dyn Force>,
            Box::new(ManyBody {
                strengths: nodes.iter().map(|n| n.charge).collect(),
            }),
            Box::new(Position {
                axis: Axis::X,
                targets: nodes.iter().map(|n| n.target_x).collect(),
                strengths: nodes.iter().map(|n| n.x_strength).collect(),
            }),
            Box::new(Position {
                axis: Axis::Y,
                targets: nodes.iter().map(|n| n.target_y).collect(),
                strengths: nodes.iter().map(|n| n.y_strength).collect(),
            }),
            Box::new(Collide {
                radii: nodes.iter().map(|n| n.collide_radius).collect(),
            }),
            Box::new(SameLayerRepulsion::new(config, tuning)),
        ];
    }

    /// Stop ticking immediately.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Set alpha and resume ticking.
    pub fn restart(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.ticks = 0;
        self.running = true;
        debug!("simulation restarted at alpha {alpha}");
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Names of the configured forces, in application order.
    pub fn force_names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|f| f.name()).collect()
    }

    /// Advance one tick if running. Returns whether the simulation is still
    /// running afterwards.
    pub fn tick(&mut self, bodies: &mut Bodies<'_>) -> bool {
        if !self.running {
            return false;
        }
        self.step(bodies);
        if self.alpha < self.alpha_min {
            self.running = false;
            debug!("simulation settled after {} ticks", self.ticks);
        }
        self.running
    }

    /// Advance exactly one tick, running or not.
    pub fn step(&mut self, bodies: &mut Bodies<'_>) {
        if bodies.len() != self.node_count {
            warn!(
                "simulation configured for {} nodes but got {}; skipping tick",
                self.node_count,
                bodies.len()
            );
            return;
        }
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        for force in &self.forces {
            force.apply(bodies, self.alpha);
        }
        let keep = 1.0 - self.velocity_decay;
        for i in 0..bodies.len() {
            bodies.vx[i] *= keep;
            bodies.vy[i] *= keep;
            bodies.x[i] += bodies.vx[i];
            bodies.y[i] += bodies.vy[i];
        }
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::layout::forces::NodeForce;
    use float_cmp::approx_eq;

    struct Buffers {
        x: Vec<f32>,
        y: Vec<f32>,
        vx: Vec<f32>,
        vy: Vec<f32>,
    }

    impl Buffers {
        fn at(points: &[(f32, f32)]) -> Self {
            Self {
                x: points.iter().map(|p| p.0).collect(),
                y: points.iter().map(|p| p.1).collect(),
                vx: vec![0.0; points.len()],
                vy: vec![0.0; points.len()],
            }
        }

        fn bodies(&mut self) -> Bodies<'_> {
            Bodies::new(&mut self.x, &mut self.y, &mut self.vx, &mut self.vy)
        }
    }

    fn idle_node(group: u32) -> NodeForce {
        NodeForce {
            charge: 0.0,
            target_x: 0.0,
            x_strength: 0.0,
            target_y: 0.0,
            y_strength: 0.0,
            collide_radius: 0.0,
            group,
            repels_same_layer: false,
        }
    }

    #[test]
    fn test_force_order() {
        let mut sim = Simulation::new(&ForceTuning::default());
        sim.configure(&ForceConfig::default(), &ForceTuning::default());
        assert_eq!(
            sim.force_names(),
            ["link", "charge", "x", "y", "collision", "sameLayerRepulsion"]
        );
    }

    #[test]
    fn test_stopped_simulation_does_not_move() {
        let tuning = ForceTuning::default();
        let mut sim = Simulation::new(&tuning);
        let mut nodes = vec![idle_node(0)];
        nodes[0].target_x = 100.0;
        nodes[0].x_strength = 1.0;
        sim.configure(&ForceConfig { nodes, links: Vec::new() }, &tuning);

        let mut buf = Buffers::at(&[(0.0, 0.0)]);
        assert!(!sim.tick(&mut buf.bodies()));
        assert_eq!(buf.x[0], 0.0);

        sim.restart(0.8);
        assert!(sim.tick(&mut buf.bodies()));
        assert!(buf.x[0] > 0.0);

        sim.stop();
        let before = buf.x[0];
        assert!(!sim.tick(&mut buf.bodies()));
        assert_eq!(buf.x[0], before);
    }

    #[test]
    fn test_alpha_decays_to_stop() {
        let tuning = ForceTuning::default();
        let mut sim = Simulation::new(&tuning);
        sim.configure(&ForceConfig { nodes: vec![idle_node(0)], links: Vec::new() }, &tuning);
        sim.restart(0.8);

        let mut buf = Buffers::at(&[(0.0, 0.0)]);
        let mut ticks = 0;
        while sim.tick(&mut buf.bodies()) {
            ticks += 1;
            assert!(ticks < 1000, "simulation never settled");
        }
        assert!(sim.alpha() < tuning.alpha_min);
        assert!(!sim.is_running());
    }

    #[test]
    fn test_position_force_converges() {
        let tuning = ForceTuning::default();
        let mut sim = Simulation::new(&tuning);
        let mut node = idle_node(0);
        node.target_x = 250.0;
        node.x_strength = 2.5;
        node.target_y = 300.0;
        node.y_strength = 0.8;
        sim.configure(&ForceConfig { nodes: vec![node], links: Vec::new() }, &tuning);
        sim.restart(0.8);

        let mut buf = Buffers::at(&[(900.0, 100.0)]);
        while sim.tick(&mut buf.bodies()) {}
        assert!(approx_eq!(f32, buf.x[0], 250.0, epsilon = 1.0));
        assert!(approx_eq!(f32, buf.y[0], 300.0, epsilon = 1.0));
    }

    #[test]
    fn test_link_pulls_endpoints_together() {
        let links = [LinkForce {
            source: NodeId(0),
            target: NodeId(1),
            strength: 0.6,
            distance: 80.0,
        }];
        let springs = LinkSprings::new(&links, 2);
        let mut buf = Buffers::at(&[(0.0, 0.0), (200.0, 0.0)]);
        springs.apply(&mut buf.bodies(), 1.0);
        assert!(buf.vx[0] > 0.0);
        assert!(buf.vx[1] < 0.0);
        // Equal degrees split the correction evenly
        assert!(approx_eq!(f32, buf.vx[0], -buf.vx[1], epsilon = 1e-4));
    }

    #[test]
    fn test_many_body_repels() {
        let charge = ManyBody {
            strengths: vec![-200.0, -200.0],
        };
        let mut buf = Buffers::at(&[(0.0, 0.0), (10.0, 0.0)]);
        charge.apply(&mut buf.bodies(), 1.0);
        assert!(buf.vx[0] < 0.0);
        assert!(buf.vx[1] > 0.0);
    }

    #[test]
    fn test_coincident_nodes_do_not_produce_nan() {
        let charge = ManyBody {
            strengths: vec![-50.0, -50.0],
        };
        let collide = Collide {
            radii: vec![7.0, 7.0],
        };
        let mut buf = Buffers::at(&[(5.0, 5.0), (5.0, 5.0)]);
        charge.apply(&mut buf.bodies(), 0.8);
        collide.apply(&mut buf.bodies(), 0.8);
        assert!(buf.vx.iter().chain(&buf.vy).all(|v| v.is_finite()));
    }

    #[test]
    fn test_collide_separates_overlap() {
        let collide = Collide {
            radii: vec![14.0, 14.0],
        };
        let mut buf = Buffers::at(&[(0.0, 0.0), (10.0, 0.0)]);
        collide.apply(&mut buf.bodies(), 1.0);
        assert!(buf.vx[0] < 0.0);
        assert!(buf.vx[1] > 0.0);

        let mut far = Buffers::at(&[(0.0, 0.0), (100.0, 0.0)]);
        collide.apply(&mut far.bodies(), 1.0);
        assert_eq!(far.vx, vec![0.0, 0.0]);
    }

    #[test]
    fn test_same_layer_repulsion() {
        let mut nodes = vec![idle_node(1), idle_node(1), idle_node(2), idle_node(1)];
        nodes[0].repels_same_layer = true;
        nodes[1].repels_same_layer = true;
        nodes[2].repels_same_layer = true;
        // Node 3 shares the layer but is staged
        let config = ForceConfig { nodes, links: Vec::new() };
        let force = SameLayerRepulsion::new(&config, &ForceTuning::default());

        let mut buf = Buffers::at(&[(0.0, 0.0), (0.0, 50.0), (0.0, 25.0), (0.0, 10.0)]);
        force.apply(&mut buf.bodies(), 1.0);

        // (150 - 50) / 50 * 0.3 = 0.6, times dy = 50, once per ordering
        assert!(approx_eq!(f32, buf.vy[0], -60.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, buf.vy[1], 60.0, epsilon = 1e-3));
        assert_eq!(buf.vy[2], 0.0);
        assert_eq!(buf.vy[3], 0.0);
    }

    #[test]
    fn test_same_layer_repulsion_sums_every_ordering() {
        let mut nodes = vec![idle_node(3), idle_node(3), idle_node(3)];
        nodes.iter_mut().for_each(|n| n.repels_same_layer = true);
        let config = ForceConfig { nodes, links: Vec::new() };
        let force = SameLayerRepulsion::new(&config, &ForceTuning::default());

        let mut buf = Buffers::at(&[(0.0, 0.0), (0.0, 40.0), (0.0, 100.0)]);
        force.apply(&mut buf.bodies(), 0.01);

        // Pair kicks: (0,1) 66, (0,2) 30, (1,2) 54
        assert!(approx_eq!(f32, buf.vy[0], -96.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, buf.vy[1], 12.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, buf.vy[2], 84.0, epsilon = 1e-3));
    }

    #[test]
    fn test_same_layer_repulsion_ignores_distant_pairs() {
        let mut nodes = vec![idle_node(0), idle_node(0)];
        nodes.iter_mut().for_each(|n| n.repels_same_layer = true);
        let config = ForceConfig { nodes, links: Vec::new() };
        let force = SameLayerRepulsion::new(&config, &ForceTuning::default());

        let mut buf = Buffers::at(&[(0.0, 0.0), (200.0, 0.0)]);
        force.apply(&mut buf.bodies(), 1.0);
        assert_eq!(buf.vx, vec![0.0, 0.0]);

        let mut stacked = Buffers::at(&[(3.0, 3.0), (3.0, 3.0)]);
        force.apply(&mut stacked.bodies(), 1.0);
        assert!(stacked.vx.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_mismatched_bodies_are_skipped() {
        let tuning = ForceTuning::default();
        let mut sim = Simulation::new(&tuning);
        sim.configure(&ForceConfig { nodes: vec![idle_node(0)], links: Vec::new() }, &tuning);
        sim.restart(0.8);
        let mut buf = Buffers::at(&[(1.0, 1.0), (2.0, 2.0)]);
        sim.step(&mut buf.bodies());
        assert_eq!(buf.x, vec![1.0, 2.0]);
    }
}
