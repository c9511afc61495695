pub mod camera;
pub mod gpu_context;
pub mod mesh_builder;
pub mod mesh_pipeline;
pub mod vertex;

pub use camera::{Camera3D, CameraUniform};
pub use gpu_context::GpuContext;
pub use mesh_builder::MeshBuilder;
pub use mesh_pipeline::MeshPipeline;
pub use vertex::MeshVertex;
