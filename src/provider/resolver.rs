//! Constructor argument resolution and instantiation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::Container;
use crate::descriptors::{AnyArc, Constructor};
use crate::error::{DiError, DiResult, MessageError};
use crate::instance::Args;

/// Resolves one bean per constructor parameter, in declaration order.
///
/// Each parameter resolves to the bean named after its type. The first
/// failure is returned as is.
pub(super) fn resolve_arguments(
    container: &Container,
    bean: &str,
    constructor: &Constructor,
) -> DiResult<Args> {
    let mut beans = Vec::with_capacity(constructor.arity());
    for param in constructor.params() {
        let dependency = param.bean_name();
        tracing::trace!(bean, dependency = %dependency, type_name = param.type_name(), "resolving argument");
        beans.push(container.get_bean(&dependency)?);
    }
    Ok(Args::new(bean, beans))
}

/// Runs the constructor; an error or panic becomes `ConstructionFailure`.
pub(super) fn instantiate(bean: &str, constructor: &Constructor, args: &Args) -> DiResult<AnyArc> {
    match panic::catch_unwind(AssertUnwindSafe(|| constructor.construct(args))) {
        Ok(Ok(object)) => Ok(object),
        Ok(Err(source)) => Err(DiError::ConstructionFailure {
            bean: bean.to_string(),
            source: Arc::from(source),
        }),
        Err(payload) => Err(DiError::ConstructionFailure {
            bean: bean.to_string(),
            source: Arc::new(MessageError::from_panic(&*payload)),
        }),
    }
}
