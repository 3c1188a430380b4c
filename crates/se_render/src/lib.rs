pub mod camera;
pub mod globe_pipeline;
pub mod gpu_context;
pub mod sphere;
pub mod texture;
pub mod vertex;

pub use camera::{CameraUniform, PerspectiveCamera};
pub use globe_pipeline::{GlobePipeline, GpuSphere, ObjectUniform};
pub use gpu_context::{GpuContext, RenderError, DEPTH_FORMAT};
pub use sphere::{build_uv_sphere, SphereMesh, DEFAULT_DIVISIONS};
pub use texture::{EarthMaterial, MapImage, MaterialPaths, Texture, TextureError};
pub use vertex::GlobeVertex;
