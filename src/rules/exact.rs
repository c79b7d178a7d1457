use crate::flow::FlowKind;
use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::EXACT_ISSUE;

/// Warns wherever exactness is erased. The conversion itself happens with the enclosing type.
pub struct Exact;

impl Rule for Exact {
    fn name(&self) -> &'static str {
        "Exact"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new()
            .on(NodeKind::ObjectTypeAnnotation, |path| {
                if let Some(FlowKind::Object(object)) = path.node().as_flow() {
                    if object.exact {
                        let span = path.node().span();
                        path.warn(
                            span,
                            "Exact types can't be expressed in TypeScript",
                            EXACT_ISSUE,
                        );
                    }
                }
                Ok(())
            })
            .on(NodeKind::GenericTypeAnnotation, |path| {
                if let Some(FlowKind::Generic(generic)) = path.node().as_flow() {
                    if generic.name() == Some("$Exact") {
                        let span = path.node().span();
                        path.warn(
                            span,
                            "$Exact types can't be expressed in TypeScript",
                            EXACT_ISSUE,
                        );
                    }
                }
                Ok(())
            })
    }
}
