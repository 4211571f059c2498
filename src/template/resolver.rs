//! Template resolution support: argument binding and cycle detection

use std::collections::HashMap;

use crate::parser::Argument;

use super::registry::{TemplateDefinition, TemplateError};

/// Names of the templates currently being expanded, outermost first
#[derive(Debug, Clone, Default)]
pub struct CallChain {
    names: Vec<String>,
}

impl CallChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a template is currently being expanded
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Mark a template as being expanded, failing if it already is
    pub fn enter(&mut self, name: &str) -> Result<(), TemplateError> {
        if self.contains(name) {
            let mut chain = self.names.clone();
            chain.push(name.to_string());
            return Err(TemplateError::Recursive { chain });
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// Mark the innermost template as done
    pub fn leave(&mut self) {
        self.names.pop();
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// One active template invocation
#[derive(Debug, Clone)]
pub struct TemplateFrame<'r> {
    pub definition: &'r TemplateDefinition,
    /// Parameter name -> raw argument text
    pub bindings: HashMap<String, String>,
}

impl<'r> TemplateFrame<'r> {
    /// Bind invocation arguments to the definition's parameters
    pub fn bind(definition: &'r TemplateDefinition, args: &[Argument]) -> Result<Self, TemplateError> {
        let bindings = bind_arguments(definition, args)?;
        Ok(Self {
            definition,
            bindings,
        })
    }

    /// Get a bound parameter value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(|s| s.as_str())
    }
}

/// Bind arguments to parameters.
///
/// Keyword arguments bind by name; positional arguments then fill the
/// remaining parameters in declaration order. The argument count must equal
/// the parameter count exactly.
pub fn bind_arguments(
    def: &TemplateDefinition,
    args: &[Argument],
) -> Result<HashMap<String, String>, TemplateError> {
    let mismatch = |reason: String| TemplateError::ArityMismatch {
        template: def.name.clone(),
        expected: def.parameters.len(),
        found: args.len(),
        reason,
    };

    if args.len() != def.parameters.len() {
        let reason = if args.len() < def.parameters.len() {
            "too few arguments".to_string()
        } else {
            "too many arguments".to_string()
        };
        return Err(mismatch(reason));
    }

    let mut bindings = HashMap::new();
    for arg in args {
        if let Some(key) = &arg.key {
            if !def.has_parameter(key) {
                return Err(mismatch(format!("unknown parameter '{}'", key)));
            }
            if bindings.insert(key.clone(), arg.value.clone()).is_some() {
                return Err(mismatch(format!("parameter '{}' bound twice", key)));
            }
        }
    }

    let mut unbound = def
        .parameters
        .iter()
        .filter(|p| !bindings.contains_key(p.as_str()))
        .cloned()
        .collect::<Vec<_>>()
        .into_iter();
    for arg in args.iter().filter(|a| a.key.is_none()) {
        match unbound.next() {
            Some(param) => {
                bindings.insert(param, arg.value.clone());
            }
            None => return Err(mismatch("too many positional arguments".to_string())),
        }
    }

    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    fn definition(params: &[&str]) -> TemplateDefinition {
        TemplateDefinition {
            name: "t".to_string(),
            human_name: None,
            parameters: params.iter().map(|p| p.to_string()).collect(),
            wrap_newlines: false,
            body: vec![],
            origin: Location::new("t.lgt", 1),
        }
    }

    #[test]
    fn test_bind_keywords() {
        let def = definition(&["a", "b"]);
        let bound = bind_arguments(
            &def,
            &[Argument::keyword("b", "2"), Argument::keyword("a", "1")],
        )
        .expect("Should bind");
        assert_eq!(bound["a"], "1");
        assert_eq!(bound["b"], "2");
    }

    #[test]
    fn test_bind_positional_in_declaration_order() {
        let def = definition(&["a", "b", "c"]);
        let bound = bind_arguments(
            &def,
            &[
                Argument::positional("x"),
                Argument::keyword("b", "y"),
                Argument::positional("z"),
            ],
        )
        .expect("Should bind");
        assert_eq!(bound["a"], "x");
        assert_eq!(bound["b"], "y");
        assert_eq!(bound["c"], "z");
    }

    #[test]
    fn test_too_few_and_too_many() {
        let def = definition(&["a", "b"]);
        let few = bind_arguments(&def, &[Argument::positional("1")]);
        assert!(matches!(few, Err(TemplateError::ArityMismatch { expected: 2, found: 1, .. })));
        let many = bind_arguments(
            &def,
            &[
                Argument::positional("1"),
                Argument::positional("2"),
                Argument::positional("3"),
            ],
        );
        assert!(matches!(many, Err(TemplateError::ArityMismatch { expected: 2, found: 3, .. })));
    }

    #[test]
    fn test_unknown_keyword_is_arity_mismatch() {
        let def = definition(&["a"]);
        let result = bind_arguments(&def, &[Argument::keyword("zzz", "1")]);
        assert!(matches!(result, Err(TemplateError::ArityMismatch { .. })));
    }

    #[test]
    fn test_duplicate_keyword_is_arity_mismatch() {
        let def = definition(&["a", "b"]);
        let result = bind_arguments(
            &def,
            &[Argument::keyword("a", "1"), Argument::keyword("a", "2")],
        );
        assert!(matches!(result, Err(TemplateError::ArityMismatch { .. })));
    }

    #[test]
    fn test_call_chain_detects_cycle() {
        let mut chain = CallChain::new();
        chain.enter("a").expect("Should enter");
        chain.enter("b").expect("Should enter");
        let err = chain.enter("a").unwrap_err();
        match err {
            TemplateError::Recursive { chain } => assert_eq!(chain, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {:?}", other),
        }
        chain.leave();
        assert_eq!(chain.depth(), 1);
        assert!(chain.enter("b").is_ok());
    }
}
