//! Query string binding.

use serde_json::{Map, Value};

use crate::binding::field_path::{CoercionError, FieldPath};

/// A query parameter declared for binding.
#[derive(Debug, Clone)]
pub struct QueryParam {
    pub name: String,
    pub path: FieldPath,
}

/// Which query parameters a route binds.
#[derive(Debug, Clone, Default)]
pub enum QueryBinding {
    /// The query string is ignored.
    #[default]
    None,
    /// Only the listed parameters are bound; anything else is ignored.
    Params(Vec<QueryParam>),
}

impl QueryBinding {
    pub fn params(&self) -> &[QueryParam] {
        match self {
            QueryBinding::None => &[],
            QueryBinding::Params(params) => params,
        }
    }

    /// Bind declared parameters from a raw (still percent-encoded) query.
    pub fn bind(&self, query: Option<&str>, root: &mut Map<String, Value>) -> Result<(), CoercionError> {
        let params = self.params();
        if params.is_empty() {
            return Ok(());
        }

        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
            .into_owned()
            .collect();

        for param in params {
            let occurrences = pairs
                .iter()
                .filter(|(key, _)| *key == param.name)
                .map(|(_, value)| value.as_str());
            param.path.bind(root, occurrences)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::schema::fixtures::REQUEST;
    use serde_json::json;

    fn binding(names: &[&str]) -> QueryBinding {
        QueryBinding::Params(
            names
                .iter()
                .map(|name| QueryParam {
                    name: name.to_string(),
                    path: FieldPath::resolve(&REQUEST, name).unwrap(),
                })
                .collect(),
        )
    }

    fn bind(binding: &QueryBinding, query: Option<&str>) -> Result<Value, CoercionError> {
        let mut root = Map::new();
        binding.bind(query, &mut root)?;
        Ok(Value::Object(root))
    }

    #[test]
    fn test_scalar_and_repeated_enum() {
        let b = binding(&["color", "colors"]);
        let value = bind(&b, Some("color=GREEN&colors=RED&colors=GREEN")).unwrap();
        assert_eq!(value, json!({"color": "GREEN", "colors": ["RED", "GREEN"]}));
    }

    #[test]
    fn test_absent_and_blank_keys_bind_nothing() {
        let b = binding(&["ids"]);
        assert_eq!(bind(&b, None).unwrap(), json!({}));
        assert_eq!(bind(&b, Some("ids=")).unwrap(), json!({}));
        assert_eq!(bind(&b, Some("ids=1&ids=2")).unwrap(), json!({"ids": [1, 2]}));
    }

    #[test]
    fn test_undeclared_and_differently_cased_keys_ignored() {
        let b = binding(&["id"]);
        assert_eq!(bind(&b, Some("name=x&ID=3")).unwrap(), json!({}));
    }

    #[test]
    fn test_coercion_failure_surfaces_literal() {
        let b = binding(&["ids"]);
        let err = bind(&b, Some("ids=1&ids=x")).unwrap_err();
        assert_eq!(err.to_string(), "For input string: \"x\"");
    }

    #[test]
    fn test_values_are_percent_decoded() {
        let b = binding(&["name"]);
        assert_eq!(bind(&b, Some("name=a%20b+c")).unwrap(), json!({"name": "a b c"}));
    }

    #[test]
    fn test_none_policy_ignores_query() {
        assert_eq!(bind(&QueryBinding::None, Some("id=x")).unwrap(), json!({}));
    }
}
