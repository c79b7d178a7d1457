use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::convert_in_place;

/// Converts the annotations written in ordinary code: parameters, return types, variables, class
/// properties, and type parameters of functions and classes.
pub struct Annotations;

impl Rule for Annotations {
    fn name(&self) -> &'static str {
        "Annotation"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new()
            .on(NodeKind::TypeAnnotation, convert_in_place)
            .on(NodeKind::TypeParameterDeclaration, convert_in_place)
    }
}
