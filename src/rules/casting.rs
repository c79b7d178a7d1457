use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::convert_in_place;

/// Converts casts: `(x: T)` becomes `(x as T)`.
pub struct Casting;

impl Rule for Casting {
    fn name(&self) -> &'static str {
        "Casting"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new().on(NodeKind::TypeCastExpression, convert_in_place)
    }
}
