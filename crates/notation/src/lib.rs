pub mod options;
pub mod outline;
pub mod renderer;
pub mod responsive;

pub use options::{Footer, RenderOptions};
pub use outline::{OutlineRenderer, PartOutline, ScoreOutline};
pub use renderer::{render_responsive, NotationRenderer, RenderError, RendererHandle};
pub use responsive::make_responsive;
