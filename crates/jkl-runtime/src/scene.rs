use log::debug;

use crate::context::{FrameContext, InitContext};
use crate::error::Result;

/// Application behaviour driven by the frame loop
///
/// `init` runs once before the first frame and is where models are loaded.
/// `frame` runs once per frame after the target is cleared.
pub trait Scene {
    fn init(&mut self, ctx: &mut InitContext<'_>) -> Result<()>;
    fn frame(&mut self, ctx: &mut FrameContext<'_>, dt: f32) -> Result<()>;
}

/// A scene that loads nothing and draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScene;

impl Scene for NoopScene {
    fn init(&mut self, _ctx: &mut InitContext<'_>) -> Result<()> {
        debug!("No scene behaviour configured");
        Ok(())
    }

    fn frame(&mut self, _ctx: &mut FrameContext<'_>, _dt: f32) -> Result<()> {
        Ok(())
    }
}
