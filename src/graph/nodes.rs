//! Explicit node-and-link form of a shell graph.

use std::fmt;

use super::{ShellGraph, ShellPass};
use crate::settings::TaperAxis;

/// Value type of an interface socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SocketType {
    Geometry,
    Int,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SocketDirection {
    Input,
    Output,
}

/// Default value of a non-geometry interface socket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SocketValue {
    Int(u32),
    Float(f32),
}

/// One socket of the graph's external interface.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceSocket {
    pub name: &'static str,
    pub direction: SocketDirection,
    pub socket_type: SocketType,
    pub default: Option<SocketValue>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
}

/// Operation performed by a node. Constant operands live on the node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    GroupInput,
    GroupOutput,
    JoinGeometry,
    /// Per-face material index.
    MaterialIndex,
    /// Integer equality against `value`.
    CompareEqual { value: u32 },
    SeparateGeometry,
    RepeatInput,
    RepeatOutput,
    /// `A op B`; `constant` replaces the unlinked operand.
    Math { op: MathOp, constant: Option<f32> },
    NamedAttribute { name: &'static str },
    SeparateXyz,
    Clamp { min: f32, max: f32 },
    Normal,
    VectorScale,
    SetPosition,
    Integer(u32),
    SetMaterialIndex,
}

/// Index of a node in [`NodeTree::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A named socket on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SocketRef {
    pub node: NodeId,
    pub socket: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub from: SocketRef,
    pub to: SocketRef,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.from.node.0, self.from.socket, self.to.node.0, self.to.socket
        )
    }
}

/// Node graph lowered from a [`ShellGraph`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeTree {
    pub name: String,
    interface: Vec<InterfaceSocket>,
    nodes: Vec<NodeKind>,
    links: Vec<Link>,
}

impl NodeTree {
    pub fn interface(&self) -> &[InterfaceSocket] {
        &self.interface
    }

    pub fn nodes(&self) -> &[NodeKind] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0)
    }

    /// Ids of every node matching `predicate`, in creation order.
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, kind)| predicate(*kind))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&NodeKind) -> bool,
    {
        self.nodes.iter().filter(|kind| predicate(*kind)).count()
    }

    /// Links arriving at `node`.
    pub fn links_into(&self, node: NodeId) -> impl Iterator<Item = &Link> + '_ {
        self.links.iter().filter(move |l| l.to.node == node)
    }

    /// Links leaving `node`.
    pub fn links_from(&self, node: NodeId) -> impl Iterator<Item = &Link> + '_ {
        self.links.iter().filter(move |l| l.from.node == node)
    }

    fn add(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(kind);
        NodeId(self.nodes.len() - 1)
    }

    fn link(&mut self, from: (NodeId, &'static str), to: (NodeId, &'static str)) {
        self.links.push(Link {
            from: SocketRef {
                node: from.0,
                socket: from.1,
            },
            to: SocketRef {
                node: to.0,
                socket: to.1,
            },
        });
    }
}

/// Lowers `graph` into nodes and links.
pub(super) fn lower(graph: &ShellGraph) -> NodeTree {
    let mut tree = NodeTree {
        name: graph.name.clone(),
        interface: vec![
            InterfaceSocket {
                name: "Geometry",
                direction: SocketDirection::Input,
                socket_type: SocketType::Geometry,
                default: None,
            },
            InterfaceSocket {
                name: "Layers",
                direction: SocketDirection::Input,
                socket_type: SocketType::Int,
                default: Some(SocketValue::Int(graph.defaults.layers)),
            },
            InterfaceSocket {
                name: "Thickness",
                direction: SocketDirection::Input,
                socket_type: SocketType::Float,
                default: Some(SocketValue::Float(graph.defaults.thickness)),
            },
            InterfaceSocket {
                name: "Geometry",
                direction: SocketDirection::Output,
                socket_type: SocketType::Geometry,
                default: None,
            },
        ],
        ..Default::default()
    };

    let input = tree.add(NodeKind::GroupInput);
    let output = tree.add(NodeKind::GroupOutput);
    let join_final = tree.add(NodeKind::JoinGeometry);
    tree.link((input, "Geometry"), (join_final, "Geometry"));

    for pass in &graph.passes {
        let accumulated = lower_pass(&mut tree, input, pass);
        tree.link((accumulated, "Accum"), (join_final, "Geometry"));
    }

    tree.link((join_final, "Geometry"), (output, "Geometry"));
    tree
}

/// Adds the nodes of one pass and returns its repeat output.
fn lower_pass(tree: &mut NodeTree, input: NodeId, pass: &ShellPass) -> NodeId {
    let material_index = tree.add(NodeKind::MaterialIndex);
    let compare = tree.add(NodeKind::CompareEqual {
        value: pass.material_index,
    });
    tree.link((material_index, "Index"), (compare, "A"));

    let separate = tree.add(NodeKind::SeparateGeometry);
    tree.link((input, "Geometry"), (separate, "Geometry"));
    tree.link((compare, "Result"), (separate, "Selection"));

    let repeat_in = tree.add(NodeKind::RepeatInput);
    let repeat_out = tree.add(NodeKind::RepeatOutput);
    tree.link((separate, "Selection"), (repeat_in, "Src"));
    tree.link((input, "Layers"), (repeat_in, "Iterations"));

    let add_one = tree.add(NodeKind::Math {
        op: MathOp::Add,
        constant: Some(1.0),
    });
    tree.link((repeat_in, "Iteration"), (add_one, "A"));

    let distance = tree.add(NodeKind::Math {
        op: MathOp::Multiply,
        constant: None,
    });
    tree.link((add_one, "Value"), (distance, "A"));
    tree.link((input, "Thickness"), (distance, "B"));

    let uv = tree.add(NodeKind::NamedAttribute { name: "UVMap" });
    let separate_xyz = tree.add(NodeKind::SeparateXyz);
    tree.link((uv, "Attribute"), (separate_xyz, "Vector"));
    let component = match pass.taper.axis {
        TaperAxis::U => "X",
        TaperAxis::V => "Y",
    };

    let clamp = tree.add(NodeKind::Clamp { min: 0.0, max: 1.0 });
    if pass.taper.invert {
        tree.link((separate_xyz, component), (clamp, "Value"));
    } else {
        let subtract = tree.add(NodeKind::Math {
            op: MathOp::Subtract,
            constant: Some(1.0),
        });
        tree.link((separate_xyz, component), (subtract, "B"));
        tree.link((subtract, "Value"), (clamp, "Value"));
    }

    let tapered = tree.add(NodeKind::Math {
        op: MathOp::Multiply,
        constant: None,
    });
    tree.link((distance, "Value"), (tapered, "A"));
    tree.link((clamp, "Result"), (tapered, "B"));

    let normal = tree.add(NodeKind::Normal);
    let scale = tree.add(NodeKind::VectorScale);
    tree.link((normal, "Normal"), (scale, "Vector"));
    tree.link((tapered, "Value"), (scale, "Scale"));

    let set_position = tree.add(NodeKind::SetPosition);
    tree.link((repeat_in, "Src"), (set_position, "Geometry"));
    tree.link((scale, "Vector"), (set_position, "Offset"));

    let slot_start = tree.add(NodeKind::Integer(pass.slot_start));
    let slot_index = tree.add(NodeKind::Math {
        op: MathOp::Add,
        constant: None,
    });
    tree.link((repeat_in, "Iteration"), (slot_index, "A"));
    tree.link((slot_start, "Integer"), (slot_index, "B"));

    let set_material = tree.add(NodeKind::SetMaterialIndex);
    tree.link((set_position, "Geometry"), (set_material, "Geometry"));
    tree.link((slot_index, "Value"), (set_material, "Material Index"));

    let join = tree.add(NodeKind::JoinGeometry);
    tree.link((repeat_in, "Accum"), (join, "Geometry"));
    tree.link((set_material, "Geometry"), (join, "Geometry"));

    tree.link((join, "Geometry"), (repeat_out, "Accum"));
    tree.link((repeat_in, "Src"), (repeat_out, "Src"));

    repeat_out
}
