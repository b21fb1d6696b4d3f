use anyhow::Result;
use humor_execution::VotingEventLayer;

use super::context::AppContext;
use crate::repl::Repl;

/// Runs the interactive voting session.
///
/// Console logging is off while the prompt is active. Session changes that
/// arrive in the background are shown as notices instead.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let (layer, notices) = VotingEventLayer::channel();
    let _guard = ctx
        .tracing()?
        .console(false)
        .events(layer)
        .init()?;

    let backend = ctx.backend().await?;
    let controller = ctx.controller(&backend);
    tracing::debug!(
        backend = %backend.label,
        sample_size = controller.sample_size(),
        "Starting voting prompt"
    );

    Repl::new(controller, backend.label.clone(), notices).run().await
}
