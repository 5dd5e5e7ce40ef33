//! Lifecycle hooks.
//!
//! A bean type that declares a zero-argument method named `init` has it
//! called exactly once, right after construction and before the bean is
//! wrapped or cached. Its return value is discarded.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{DiError, DiResult, ErrorSource, MessageError};
use crate::instance::{Bean, CallArgs};
use crate::observer::Observers;

/// Name of the initialization hook.
pub const INIT_HOOK: &str = "init";

/// Calls the `init` hook of `bean` if its type declares one.
///
/// An error or panic from the hook becomes `InitializationFailure`.
pub(crate) fn invoke_init(bean: &Bean, observers: &Observers) -> DiResult<()> {
    let Some(hook) = bean.bean_type().find_method(INIT_HOOK, 0) else {
        return Ok(());
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        hook.invoke(bean.instance_object(), CallArgs::new())
    }));
    let source: ErrorSource = match outcome {
        Ok(Ok(_)) => {
            tracing::debug!(bean = bean.name(), hook = INIT_HOOK, "lifecycle hook completed");
            observers.initialized(bean.name(), INIT_HOOK);
            return Ok(());
        }
        Ok(Err(source)) => Arc::from(source),
        Err(payload) => Arc::new(MessageError::from_panic(&*payload)),
    };
    Err(DiError::InitializationFailure {
        bean: bean.name().to_string(),
        hook: INIT_HOOK,
        source,
    })
}
