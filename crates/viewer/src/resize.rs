use murex_common::Viewport;

use crate::context::AppContext;
use crate::error::ViewerError;
use crate::presenter::FramePresenter;

/// React to a new surface size: camera aspect and projection, post
/// targets and pass uniforms, then the presenter.
pub fn handle_resize<P>(
    ctx: &mut AppContext,
    presenter: &mut P,
    width: u32,
    height: u32,
) -> Result<Viewport, ViewerError>
where
    P: FramePresenter + ?Sized,
{
    let viewport = Viewport::new(width, height)?;
    ctx.apply_viewport(viewport)?;
    presenter.resize(viewport)?;
    tracing::info!(width, height, aspect = viewport.aspect(), "viewport resized");
    Ok(viewport)
}
