use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConvertError, RegistryError};
use crate::node::NodeKind;
use crate::rules;
use crate::visit::Path;

/// Rules that run before all others, in this order. Names that are not registered are skipped.
pub const PRIORITY: [&str; 7] = [
    "$Keys",
    "Bounds",
    "Casting",
    "Exact",
    "Variance",
    "Indexer",
    "TypeAlias",
];

/// A rewrite function for one kind of node.
pub type Handler = Box<dyn Fn(&mut Path<'_>) -> Result<(), ConvertError>>;

/// The handlers a rule contributes, keyed by node kind.
#[derive(Default)]
pub struct Handlers {
    entries: Vec<(NodeKind, Handler)>,
}

impl Handlers {
    /// An empty set of handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler for nodes of `kind`.
    pub fn on(
        mut self,
        kind: NodeKind,
        handler: impl Fn(&mut Path<'_>) -> Result<(), ConvertError> + 'static,
    ) -> Self {
        let handler: Handler = Box::new(handler);
        self.entries.push((kind, handler));
        self
    }

    /// The number of handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named rewrite of the program tree.
///
/// Rules are built once and shared between compilations; [`Rule::handlers`] is called once per
/// compilation to get fresh handlers.
pub trait Rule: Send + Sync {
    /// The unique name of the rule.
    fn name(&self) -> &'static str;

    /// The handlers of the rule.
    fn handlers(&self) -> Handlers;
}

/// The handlers of every registered rule, merged into one chain per node kind.
#[derive(Default)]
pub struct Visitor {
    chains: HashMap<NodeKind, Vec<Handler>>,
}

impl Visitor {
    /// The chain for `kind`, in the order the handlers run.
    pub fn handlers(&self, kind: NodeKind) -> &[Handler] {
        self.chains.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The set of rules a compilation runs.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the rules that ship with this crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::with_rules(rules::builtin())
    }

    /// A registry holding `rules`, registered in order.
    pub fn with_rules(
        rules: impl IntoIterator<Item = Box<dyn Rule>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for rule in rules {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    /// Adds a rule. Fails if a rule with the same name is already registered.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RegistryError> {
        let name = rule.name();
        if self.get(name).is_some() {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
            });
        }
        debug!(rule = name, "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    /// The rule registered under `name`.
    pub fn get(&self, name: &str) -> Option<&(dyn Rule + 'static)> {
        self.rules
            .iter()
            .find(|rule| rule.name() == name)
            .map(Box::as_ref)
    }

    /// The number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The registered rules in the order their handlers run: [`PRIORITY`] first, then the rest
    /// in registration order.
    pub fn order(&self) -> Vec<&(dyn Rule + 'static)> {
        let prioritized = PRIORITY.iter().filter_map(|name| self.get(name));
        let rest = self
            .rules
            .iter()
            .filter(|rule| !PRIORITY.contains(&rule.name()))
            .map(Box::as_ref);
        prioritized.chain(rest).collect()
    }

    /// Merges the handlers of every rule into a single [`Visitor`].
    ///
    /// When several rules handle the same kind, the chain calls each of them in [`Self::order`],
    /// each on the node as the previous one left it.
    pub fn compose(&self) -> Visitor {
        let mut chains: HashMap<NodeKind, Vec<Handler>> = HashMap::new();
        for rule in self.order() {
            let handlers = rule.handlers();
            debug!(rule = rule.name(), handlers = handlers.len(), "composing rule");
            for (kind, handler) in handlers.entries {
                chains.entry(kind).or_default().push(handler);
            }
        }
        Visitor { chains }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::testing::*;
    use crate::ts::{Keyword, Ts, TsType};
    use crate::warning::Warnings;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use swc_common::sync::Lrc;
    use swc_common::SourceMap;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records its name and the kind of node it saw, and optionally replaces the node.
    struct Recorder {
        name: &'static str,
        log: Log,
        replace: bool,
    }

    impl Rule for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn handlers(&self) -> Handlers {
            let name = self.name;
            let log = Arc::clone(&self.log);
            let replace = self.replace;
            Handlers::new().on(NodeKind::StringTypeAnnotation, move |path| {
                log.lock()
                    .expect("log")
                    .push(format!("{}:{}", name, path.node().kind()));
                if replace {
                    path.replace_with(Ts::Type(TsType::keyword(Keyword::String)));
                }
                Ok(())
            })
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Box<dyn Rule> {
        Box::new(Recorder {
            name,
            log: Arc::clone(log),
            replace: false,
        })
    }

    fn run(registry: &RuleRegistry, mut node: Node) -> Node {
        let mut warnings = Warnings::new(Lrc::<SourceMap>::default());
        crate::visit::traverse_node(&mut node, &registry.compose(), &mut warnings)
            .expect("traversal");
        node
    }

    #[test]
    fn priority_rules_run_first() {
        let log = Log::default();
        let registry = RuleRegistry::with_rules([
            recorder("Zeta", &log),
            recorder("TypeAlias", &log),
            recorder("Alpha", &log),
            recorder("$Keys", &log),
            recorder("Exact", &log),
        ])
        .expect("unique names");

        run(&registry, type_helper("string"));
        assert_eq!(
            *log.lock().expect("log"),
            vec![
                "$Keys:StringTypeAnnotation",
                "Exact:StringTypeAnnotation",
                "TypeAlias:StringTypeAnnotation",
                "Zeta:StringTypeAnnotation",
                "Alpha:StringTypeAnnotation",
            ]
        );
    }

    #[test]
    fn later_handlers_see_replacements() {
        let log = Log::default();
        let mut registry = RuleRegistry::new();
        registry
            .register(Box::new(Recorder {
                name: "First",
                log: Arc::clone(&log),
                replace: true,
            }))
            .expect("unique");
        registry.register(recorder("Second", &log)).expect("unique");

        let node = run(&registry, type_helper("string"));
        assert_eq!(node.kind(), NodeKind::TSType);
        assert_eq!(
            *log.lock().expect("log"),
            vec!["First:StringTypeAnnotation", "Second:TSType"]
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let log = Log::default();
        let mut registry = RuleRegistry::new();
        registry.register(recorder("Custom", &log)).expect("first Custom");
        let err = registry
            .register(recorder("Custom", &log))
            .expect_err("second Custom");
        assert_eq!(
            err,
            RegistryError::Duplicate {
                name: "Custom".to_string()
            }
        );
        assert_eq!(registry.len(), 1);

        let mut registry = RuleRegistry::builtin().expect("builtin rules");
        let before = registry.len();
        let err = registry
            .register(recorder("Casting", &log))
            .expect_err("builtin name");
        assert!(matches!(err, RegistryError::Duplicate { .. }));
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn builtin_order() {
        let registry = RuleRegistry::builtin().expect("builtin rules");
        let order: Vec<&str> = registry.order().iter().map(|rule| rule.name()).collect();
        assert_eq!(
            order,
            vec![
                "$Keys",
                "Bounds",
                "Casting",
                "Exact",
                "Variance",
                "Indexer",
                "TypeAlias",
                "Annotation",
                "Interface",
                "TypeImport",
            ]
        );
    }

    #[test]
    fn compose_reflects_later_registrations() {
        let log = Log::default();
        let mut registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert!(Handlers::new().is_empty());
        assert_eq!(registry.compose().handlers(NodeKind::StringTypeAnnotation).len(), 0);

        registry.register(recorder("Late", &log)).expect("unique");
        let visitor = registry.compose();
        assert_eq!(visitor.handlers(NodeKind::StringTypeAnnotation).len(), 1);
        assert_eq!(visitor.handlers(NodeKind::NumberTypeAnnotation).len(), 0);
    }
}
