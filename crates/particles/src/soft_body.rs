//! Pressure-filled soft bodies.
//!
//! A [`SoftBody`] is a closed ring of particles. Neighbouring nodes are joined
//! by structural springs, nodes two apart by bending springs, and every edge
//! is pushed outward in proportion to how far the enclosed area has fallen
//! below its rest area. The result is a blob that squashes on impact and
//! recovers its volume.

use fresco_core::{FrescoError, Shape};
use glam::DVec2;

use crate::particle::Particle;
use crate::spatial_hash::SpatialHash;
use crate::system::{pair_mut, resolve_contact, Bounds};

#[derive(Debug, Clone)]
pub struct SoftBody {
    nodes: Vec<Particle>,
    edge_rest: f64,
    bend_rest: f64,
    target_area: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub pressure: f64,
    pub substeps: usize,
}

impl SoftBody {
    /// Circular body of `resolution` nodes. Needs at least 3 nodes and a
    /// positive radius.
    pub fn new(center: DVec2, radius: f64, resolution: usize) -> Result<Self, FrescoError> {
        let ring = Shape::circle(center, radius, resolution)?;
        let target_area = ring.area();
        if target_area <= 0.0 {
            return Err(FrescoError::DegenerateShape(format!(
                "soft body radius must be positive, got {radius}"
            )));
        }
        let verts = ring.vertices();
        let edge_rest = verts[0].distance(verts[1]);
        let bend_rest = verts[0].distance(verts[2 % verts.len()]);
        let nodes = verts
            .iter()
            .map(|&v| Particle::at_rest(v, edge_rest * 0.5))
            .collect();
        Ok(Self {
            nodes,
            edge_rest,
            bend_rest,
            target_area,
            stiffness: 0.3,
            damping: 0.05,
            pressure: 1.0,
            substeps: 4,
        })
    }

    pub fn nodes(&self) -> &[Particle] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Particle] {
        &mut self.nodes
    }

    pub fn resolution(&self) -> usize {
        self.nodes.len()
    }

    pub fn target_area(&self) -> f64 {
        self.target_area
    }

    /// Enclosed area of the current outline.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    fn signed_area(&self) -> f64 {
        let n = self.nodes.len();
        (0..n)
            .map(|i| {
                let a = self.nodes[i].position;
                let b = self.nodes[(i + 1) % n].position;
                a.perp_dot(b)
            })
            .sum::<f64>()
            * 0.5
    }

    pub fn centroid(&self) -> DVec2 {
        self.nodes.iter().map(|p| p.position).sum::<DVec2>() / self.nodes.len() as f64
    }

    /// Mean node velocity.
    pub fn velocity(&self) -> DVec2 {
        self.nodes.iter().map(|p| p.velocity).sum::<DVec2>() / self.nodes.len() as f64
    }

    /// Adds `dv` to every node's velocity.
    pub fn push(&mut self, dv: DVec2) {
        for node in &mut self.nodes {
            node.velocity += dv;
        }
    }

    /// Closed outline with one vertex per node.
    pub fn shape(&self) -> Shape {
        Shape::polygon(self.nodes.iter().map(|p| p.position).collect())
    }

    /// Advances by `dt` split into `substeps` integration steps.
    pub fn step(&mut self, gravity: DVec2, dt: f64, drag: f64, bounds: &Bounds) {
        let substeps = self.substeps.max(1);
        let h = dt / substeps as f64;
        for _ in 0..substeps {
            self.accumulate_forces(gravity);
            for node in &mut self.nodes {
                node.update(h, drag);
                bounds.apply(node);
            }
        }
    }

    fn accumulate_forces(&mut self, gravity: DVec2) {
        let n = self.nodes.len();
        for node in &mut self.nodes {
            node.apply_force(gravity * node.mass);
        }

        for i in 0..n {
            self.spring(i, (i + 1) % n, self.edge_rest);
            if n > 3 {
                self.spring(i, (i + 2) % n, self.bend_rest);
            }
        }

        let signed = self.signed_area();
        let deficit = (self.target_area - signed.abs()) / self.target_area;
        // outward normal of edge a->b is (e.y, -e.x) for counter-clockwise rings
        let winding = if signed >= 0.0 { 1.0 } else { -1.0 };
        for i in 0..n {
            let j = (i + 1) % n;
            let e = self.nodes[j].position - self.nodes[i].position;
            let outward = DVec2::new(e.y, -e.x) * winding;
            // |outward| == |e|, so the force scales with edge length
            let f = outward * (self.pressure * deficit * 0.5);
            self.nodes[i].apply_force(f);
            self.nodes[j].apply_force(f);
        }
    }

    fn spring(&mut self, i: usize, j: usize, rest: f64) {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let (a, b) = pair_mut(&mut self.nodes, lo, hi);
        let delta = b.position - a.position;
        let len = delta.length();
        if len < 1e-9 {
            return;
        }
        let dir = delta / len;
        let stretch = self.stiffness * (len - rest);
        let damp = self.damping * (b.velocity - a.velocity).dot(dir);
        let f = dir * (stretch + damp);
        a.apply_force(f);
        b.apply_force(-f);
    }
}

/// Resolves node-node contacts between distinct bodies. Returns the number of
/// contacts resolved.
pub fn collide_bodies(bodies: &mut [SoftBody], restitution: f64) -> usize {
    let mut contacts = 0;
    for i in 0..bodies.len() {
        for j in i + 1..bodies.len() {
            let (a, b) = pair_mut(bodies, i, j);
            if !bounds_overlap(a, b) {
                continue;
            }
            let cell = a
                .nodes
                .iter()
                .chain(&b.nodes)
                .map(|p| p.radius)
                .fold(0.0, f64::max)
                * 2.0;
            let positions: Vec<DVec2> = b.nodes.iter().map(|p| p.position).collect();
            let hash = SpatialHash::build(cell, &positions);
            for na in &mut a.nodes {
                for k in hash.near(na.position) {
                    if resolve_contact(na, &mut b.nodes[k], restitution) {
                        contacts += 1;
                    }
                }
            }
        }
    }
    contacts
}

fn bounds_overlap(a: &SoftBody, b: &SoftBody) -> bool {
    let extent = |body: &SoftBody| {
        body.nodes.iter().fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(lo, hi), p| {
                let r = DVec2::splat(p.radius);
                (lo.min(p.position - r), hi.max(p.position + r))
            },
        )
    };
    let (a_lo, a_hi) = extent(a);
    let (b_lo, b_hi) = extent(b);
    a_lo.cmple(b_hi).all() && b_lo.cmple(a_hi).all()
}
