use crate::convert::convert_type;
use crate::error::ConvertError;
use crate::flow::FlowKind;
use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};
use crate::ts::{Ts, TsType, TsTypeKind};

/// `$Keys<T>` becomes `keyof T`.
pub struct Keys;

impl Rule for Keys {
    fn name(&self) -> &'static str {
        "$Keys"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new().on(NodeKind::GenericTypeAnnotation, |path| {
            let Some(FlowKind::Generic(generic)) = path.node().as_flow() else {
                return Ok(());
            };
            if generic.name() != Some("$Keys") {
                return Ok(());
            }

            let span = path.node().span();
            let argument = generic
                .type_params
                .as_ref()
                .and_then(|params| params.first())
                .ok_or_else(|| ConvertError::MissingTypeArgument {
                    name: "$Keys".to_string(),
                    span,
                })?;
            let keyof = TsType::new(TsTypeKind::KeyOf(Box::new(convert_type(argument)?)), span);

            path.replace_with(Ts::Type(keyof));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ConvertError, Error};
    use crate::testing::*;

    #[test]
    fn keys_become_keyof() {
        assert_eq!(compile_helper("type K = $Keys<O>;").code, "type K = keyof O;\n");
        assert_eq!(
            compile_helper("type K = $Keys<A | B>;").code,
            "type K = keyof (A | B);\n"
        );
    }

    #[test]
    fn nested_keys() {
        assert_eq!(
            compile_helper("type K = Array<$Keys<typeof o>>;").code,
            "type K = Array<keyof typeof o>;\n"
        );
    }

    #[test]
    fn keys_need_an_argument() {
        let err = try_compile_helper("type K = $Keys;").expect_err("missing argument");
        assert!(matches!(
            err.error,
            Error::Convert(ConvertError::MissingTypeArgument { .. })
        ));
        assert_eq!((err.line, err.column), (1, 10));
    }
}
