//! Render graph: the versioned, backend-agnostic instruction list handed to an encoder.
//!
//! Emission is a pure function of the planned timeline, transitions, lanes and output profile;
//! executing the graph is the job of an [`crate::encode::EncoderBackend`].

pub(crate) mod emit;
pub(crate) mod model;
pub(crate) mod validate;

pub use emit::emit_render_graph;
pub use model::{
    Corner, GraphInput, InputId, NodeId, NodeOp, RENDER_GRAPH_VERSION, RenderGraph,
    RenderGraphNode, ScaleFit, StreamKind, StreamRef,
};

#[cfg(test)]
#[path = "../../tests/unit/graph/graph.rs"]
mod tests;
