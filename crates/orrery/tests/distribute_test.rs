use orrery::{
    Clusterability, DistributeOptions, Error, Graph, Node, NodeIdentity, Registration, distribute,
    layout,
};
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone)]
struct Planet {
    name: String,
    radius: f64,
    kind: Option<char>,
    min: usize,
    max: usize,
    x: Option<f64>,
    y: Option<f64>,
    orbit: Option<f64>,
    log: Log,
}

impl Planet {
    fn new(name: &str, radius: f64, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            radius,
            kind: None,
            min: 1,
            max: 1,
            x: None,
            y: None,
            orbit: None,
            log: log.clone(),
        }
    }

    fn clustering(mut self, kind: char, min: usize, max: usize) -> Self {
        self.kind = Some(kind);
        self.min = min;
        self.max = max;
        self
    }
}

impl Node for Planet {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn min_cluster_size(&self) -> usize {
        self.min
    }

    fn max_cluster_size(&self) -> usize {
        self.max
    }

    fn clusterable_with(&self, other: &Self) -> Clusterability {
        match (self.kind, other.kind) {
            (Some(a), Some(b)) if a == b => Clusterability::Siblings,
            _ => Clusterability::Deny,
        }
    }

    fn merge_with(&self, other: &Self) -> Self {
        let mut names: Vec<&str> = self.name.split('+').chain(other.name.split('+')).collect();
        names.sort();
        Self {
            name: names.join("+"),
            radius: (self.radius.powi(2) + other.radius.powi(2)).sqrt(),
            kind: self.kind,
            min: self.min.max(other.min),
            max: self.max.min(other.max),
            x: None,
            y: None,
            orbit: None,
            log: self.log.clone(),
        }
    }

    fn set_orbit(&mut self, orbit: f64) {
        self.orbit = Some(orbit);
    }

    fn set_x(&mut self, x: f64) {
        self.log.borrow_mut().push(self.name.clone());
        self.x = Some(x);
    }

    fn set_y(&mut self, y: f64) {
        self.y = Some(y);
    }
}

fn reg(node: Planet, neighbors: &[&str]) -> Registration<Planet, String> {
    Registration::new(
        node.name.clone(),
        node,
        neighbors.iter().map(|s| s.to_string()),
    )
}

fn triangles(log: &Log) -> Vec<Registration<Planet, String>> {
    vec![
        reg(Planet::new("a", 1.0, log), &["b", "c"]),
        reg(Planet::new("b", 1.0, log), &["c"]),
        reg(Planet::new("c", 1.0, log), &[]),
        reg(Planet::new("x", 2.0, log), &["y"]),
        reg(Planet::new("y", 1.0, log), &["z"]),
        reg(Planet::new("z", 1.0, log), &["x"]),
    ]
}

/// A deterministic graph mixing a deep branch, a wide fan and a few cycles.
fn mixed(log: &Log) -> Vec<Registration<Planet, String>> {
    let mut out = Vec::new();
    for i in 0..40usize {
        let mut neighbors: Vec<String> = Vec::new();
        if i > 0 {
            neighbors.push(format!("n{}", (i - 1) / 3));
        }
        if i % 7 == 3 && i + 5 < 40 {
            neighbors.push(format!("n{}", i + 5));
        }
        let radius = 0.5 + (i % 4) as f64;
        out.push(Registration::new(
            format!("n{i}"),
            Planet::new(&format!("n{i}"), radius, log),
            neighbors,
        ));
    }
    out
}

fn id(s: &str) -> NodeIdentity<String> {
    NodeIdentity::of(s.to_string())
}

#[test]
fn empty_input_yields_empty_output() {
    let regs: Vec<Registration<Planet, String>> = Vec::new();
    let out = distribute(regs, &DistributeOptions::default()).unwrap();
    assert!(out.is_empty());
}

#[test]
fn single_node_is_placed_on_the_origin_with_its_own_radius_as_orbit() {
    let log = Log::default();
    let out = distribute(
        vec![reg(Planet::new("solo", 3.0, &log), &[])],
        &DistributeOptions::default(),
    )
    .unwrap();
    assert_eq!(out.len(), 1);
    let node = &out[0].node;
    assert_eq!(out[0].id, id("solo"));
    assert_eq!((node.x, node.y, node.orbit), (Some(0.0), Some(0.0), Some(3.0)));
}

#[test]
fn unknown_neighbor_is_rejected_by_name() {
    let log = Log::default();
    let err = distribute(
        vec![
            reg(Planet::new("a", 1.0, &log), &["b"]),
            reg(Planet::new("b", 1.0, &log), &["ghost"]),
        ],
        &DistributeOptions::default(),
    )
    .unwrap_err();
    match &err {
        Error::UnknownNeighbor { node, neighbor } => {
            assert_eq!(node, "b");
            assert_eq!(neighbor, "ghost");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn invalid_nodes_are_rejected() {
    let log = Log::default();
    let dup = distribute(
        vec![
            reg(Planet::new("a", 1.0, &log), &[]),
            reg(Planet::new("a", 2.0, &log), &[]),
        ],
        &DistributeOptions::default(),
    );
    assert!(matches!(dup, Err(Error::DuplicateNode { id }) if id == "a"));

    let flat = distribute(
        vec![reg(Planet::new("a", 0.0, &log), &[])],
        &DistributeOptions::default(),
    );
    assert!(matches!(flat, Err(Error::InvalidRadius { .. })));

    let bounds = distribute(
        vec![reg(Planet::new("a", 1.0, &log).clustering('k', 3, 2), &[])],
        &DistributeOptions::default(),
    );
    assert!(matches!(
        bounds,
        Err(Error::InvalidClusterBounds { min: 3, max: 2, .. })
    ));
}

#[test]
fn disconnected_triangles_become_one_layout_tree() {
    let log = Log::default();
    let out = distribute(triangles(&log), &DistributeOptions::default()).unwrap();
    assert_eq!(out.len(), 6);
    for r in &out {
        let (x, y, orbit) = (r.node.x.unwrap(), r.node.y.unwrap(), r.node.orbit.unwrap());
        assert!(x.is_finite() && y.is_finite() && orbit.is_finite(), "{}", r.id);
    }
    // Synthetic links are not reported as neighbors.
    let a = out.iter().find(|r| r.id == id("a")).unwrap();
    let mut neighbors = a.neighbors.clone();
    neighbors.sort();
    assert_eq!(neighbors, vec![id("b"), id("c")]);

    let mut g = Graph::from_registrations(triangles(&log)).unwrap();
    let l = layout(&mut g, &DistributeOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(l.root(), &id("a"));
    assert_eq!(l.tree().len(), 6);
    assert_eq!(l.parent(&id("x")), Some(&id("a")));
    assert!(g.has_bridge(&id("a"), &id("x")));
}

#[test]
fn parents_are_placed_before_their_children() {
    let log = Log::default();
    distribute(mixed(&log), &DistributeOptions::default()).unwrap();
    let order = log.borrow().clone();
    assert_eq!(order.len(), 40);

    let mut g = Graph::from_registrations(mixed(&Log::default())).unwrap();
    let l = layout(&mut g, &DistributeOptions::default())
        .unwrap()
        .unwrap();
    let position = |name: &str| order.iter().position(|n| n == name).unwrap();
    for (node, _) in l.placements() {
        if let Some(parent) = l.parent(node) {
            let (node, parent) = (node.to_string(), parent.to_string());
            assert!(position(&parent) < position(&node), "{parent} after {node}");
        }
    }
}

#[test]
fn orbits_and_slices_respect_the_layout_invariants() {
    let mut g = Graph::from_registrations(mixed(&Log::default())).unwrap();
    let l = layout(&mut g, &DistributeOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(l.placements().count(), 40);

    for (node, p) in l.placements() {
        assert!(p.x.is_finite() && p.y.is_finite() && p.orbit.is_finite());
        let children = l.children(node);
        let widest_child = children
            .iter()
            .map(|c| l.placement(c).unwrap().orbit)
            .fold(0.0, f64::max);
        let radius = g.node(node).unwrap().radius;
        assert!(p.orbit >= radius + widest_child - 1e-9, "{node}");

        let slices: f64 = children.iter().map(|c| l.placement(c).unwrap().slice).sum();
        assert!(slices <= TAU + 1e-9, "{node}: {slices}");

        for c in children {
            let cp = l.placement(c).unwrap();
            let dist = ((cp.x - p.x).powi(2) + (cp.y - p.y).powi(2)).sqrt();
            assert!((dist - p.orbit).abs() < 1e-9, "{c} is off {node}'s orbit");
        }
    }
}

#[test]
fn siblings_cluster_in_pairs_with_one_left_over() {
    let log = Log::default();
    let mut regs = vec![reg(
        Planet::new("hub", 1.0, &log),
        &["s1", "s2", "s3", "s4", "s5"],
    )];
    for name in ["s1", "s2", "s3", "s4", "s5"] {
        regs.push(reg(Planet::new(name, 1.0, &log).clustering('s', 2, 2), &[]));
    }

    let out = distribute(regs, &DistributeOptions::default()).unwrap();
    assert_eq!(out.len(), 4);
    let pairs: Vec<_> = out.iter().filter(|r| r.id.len() == 2).collect();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].node.name, "s1+s2");
    assert!(out.iter().any(|r| r.id == id("s5")));

    let hub = out.iter().find(|r| r.id == id("hub")).unwrap();
    assert_eq!(hub.neighbors.len(), 3);
    assert!(hub.neighbors.contains(&pairs[1].id));
    assert!(out.iter().all(|r| r.node.orbit.is_some()));
}

#[test]
fn clustering_can_be_disabled() {
    let log = Log::default();
    let mut regs = vec![reg(Planet::new("hub", 1.0, &log), &["s1", "s2"])];
    for name in ["s1", "s2"] {
        regs.push(reg(Planet::new(name, 1.0, &log).clustering('s', 2, 2), &[]));
    }
    let out = distribute(regs, &DistributeOptions { clustering: false }).unwrap();
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|r| !r.id.is_cluster()));
}

#[test]
fn merge_order_does_not_change_the_composite() {
    let log = Log::default();
    let a = Planet::new("a", 1.0, &log).clustering('k', 2, 5);
    let b = Planet::new("b", 2.0, &log).clustering('k', 3, 4);
    let c = Planet::new("c", 3.0, &log).clustering('k', 2, 3);

    let left = a.merge_with(&b).merge_with(&c);
    let right = a.merge_with(&b.merge_with(&c));
    assert!((left.radius() - right.radius()).abs() < 1e-12);
    assert_eq!(left.min_cluster_size(), right.min_cluster_size());
    assert_eq!(left.max_cluster_size(), right.max_cluster_size());
    assert_eq!(left.name, right.name);
}

/// Siblings whose composite collapses to nothing.
#[derive(Debug, Clone)]
struct Vapor(f64);

impl Node for Vapor {
    fn radius(&self) -> f64 {
        self.0
    }

    fn max_cluster_size(&self) -> usize {
        2
    }

    fn clusterable_with(&self, _other: &Self) -> Clusterability {
        Clusterability::Siblings
    }

    fn merge_with(&self, _other: &Self) -> Self {
        Vapor(0.0)
    }

    fn set_orbit(&mut self, _orbit: f64) {}

    fn set_x(&mut self, _x: f64) {}

    fn set_y(&mut self, _y: f64) {}
}

#[test]
fn invalid_composites_are_reported_instead_of_laid_out() {
    let regs = vec![
        Registration::new("hub", Vapor(1.0), vec!["a", "b"]),
        Registration::new("a", Vapor(1.0), vec![]),
        Registration::new("b", Vapor(1.0), vec![]),
    ];
    let err = distribute(regs.clone(), &DistributeOptions::default()).unwrap_err();
    assert!(matches!(&err, Error::InvalidRadius { id, .. } if id == "{a, b}"));

    let out = distribute(regs, &DistributeOptions { clustering: false }).unwrap();
    assert_eq!(out.len(), 3);
}
