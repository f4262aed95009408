//! The appender pipeline: base document → ordered appenders → final document.

use bootcfg_shared::{IgnitionConfig, Result};

use crate::appenders::{Appender, InitialPivot, Kubeconfig, NodeAnnotations};
use crate::kubeconfig::KubeconfigSource;

/// Per-request inputs to [`get_appenders`].
#[derive(Debug, Clone, Default)]
pub struct AppendParams {
    /// Name of the config the node last applied.
    pub current_config: String,
    /// OS image to pivot to on first boot. Empty skips the pivot step.
    pub os_image_url: String,
}

/// Build the standard appender sequence for one request:
/// node annotations, then initial pivot, then kubeconfig.
pub fn get_appenders<'a>(
    params: &'a AppendParams,
    kubeconfig: &'a dyn KubeconfigSource,
) -> Vec<Box<dyn Appender + 'a>> {
    vec![
        Box::new(NodeAnnotations {
            current_config: &params.current_config,
        }),
        Box::new(InitialPivot {
            os_image_url: &params.os_image_url,
        }),
        Box::new(Kubeconfig { source: kubeconfig }),
    ]
}

/// Apply `appenders` to `config` in order.
///
/// Stops at the first failure and returns that error as-is. Contributions
/// from earlier appenders stay in `config`; callers should drop it.
pub fn run(config: &mut IgnitionConfig, appenders: &[Box<dyn Appender + '_>]) -> Result<()> {
    for appender in appenders {
        appender.append(config)?;
    }
    Ok(())
}

/// Run the standard appenders over `base`, returning the document only if
/// every step succeeded.
pub fn assemble(
    mut base: IgnitionConfig,
    params: &AppendParams,
    kubeconfig: &dyn KubeconfigSource,
) -> Result<IgnitionConfig> {
    run(&mut base, &get_appenders(params, kubeconfig))?;
    Ok(base)
}
