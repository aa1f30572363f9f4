use gastro_types::{HostObject, RequestInfo, Value};
use std::collections::BTreeMap;

/// The incoming HTTP request as seen by frontmatter and templates.
///
/// Exposed as `Request`: fields `Method`, `Path`, `URL`, `Host`, `Headers`,
/// `Query`; methods `Path()`, `Method()`, `URL()`, `Header(name)`,
/// `QueryParam(name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
    pub host: String,
    pub headers: BTreeMap<String, String>,
}

impl Request {
    /// Build from a method and a request target such as `/posts?page=2`.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Self {
            method: method.into(),
            path: path.to_string(),
            query: query.to_string(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Add a header. Names are stored lowercase.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Query parameters; the first occurrence of a repeated key wins.
    pub fn query_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        for pair in self.query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        params
    }
}

impl RequestInfo for Request {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn method(&self) -> String {
        self.method.clone()
    }

    fn url(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

impl HostObject for Request {
    fn type_name(&self) -> &str {
        "Request"
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "Method" => Value::from(self.method.as_str()),
            "Path" => Value::from(self.path.as_str()),
            "URL" => Value::String(RequestInfo::url(self)),
            "Host" => Value::from(self.host.as_str()),
            "Headers" => Value::Map(
                self.headers
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect(),
            ),
            "Query" => Value::Map(
                self.query_params()
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ),
            _ => return None,
        };
        Some(value)
    }

    fn call(&self, method: &str, args: &[Value]) -> Option<Result<Vec<Value>, String>> {
        let result = match (method, args) {
            ("Path" | "Method" | "URL", []) => Ok(vec![self.field(method)?]),
            ("Header", [Value::String(name)]) => {
                Ok(vec![Value::from(self.header(name).unwrap_or(""))])
            }
            ("QueryParam", [Value::String(name)]) => Ok(vec![Value::String(
                self.query_params().remove(name).unwrap_or_default(),
            )]),
            ("Path" | "Method" | "URL" | "Header" | "QueryParam", _) => {
                Err(format!("Request.{method}: wrong arguments"))
            }
            _ => return None,
        };
        Some(result)
    }

    fn request_info(&self) -> Option<&dyn RequestInfo> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new("GET", "/posts?page=2&tag=rust&page=9")
            .with_host("example.com")
            .with_header("Accept-Language", "en")
    }

    #[test]
    fn test_target_split() {
        let req = request();
        assert_eq!(req.path, "/posts");
        assert_eq!(req.query, "page=2&tag=rust&page=9");
        assert_eq!(RequestInfo::url(&req), "/posts?page=2&tag=rust&page=9");
        assert_eq!(RequestInfo::url(&Request::new("GET", "/")), "/");
    }

    #[test]
    fn test_query_first_value_wins() {
        let params = request().query_params();
        assert_eq!(params.get("page").map(String::as_str), Some("2"));
        assert_eq!(params.get("tag").map(String::as_str), Some("rust"));
    }

    #[test]
    fn test_fields() {
        let req = request();
        assert_eq!(req.field("Method"), Some(Value::from("GET")));
        assert_eq!(req.field("Host"), Some(Value::from("example.com")));
        assert_eq!(
            req.field("Headers").and_then(|h| h.member("accept-language")),
            Some(Value::from("en"))
        );
        assert_eq!(req.field("Body"), None);
    }

    #[test]
    fn test_methods() {
        let req = request();
        assert_eq!(req.call("Path", &[]), Some(Ok(vec![Value::from("/posts")])));
        assert_eq!(
            req.call("Header", &[Value::from("ACCEPT-LANGUAGE")]),
            Some(Ok(vec![Value::from("en")]))
        );
        assert_eq!(
            req.call("QueryParam", &[Value::from("missing")]),
            Some(Ok(vec![Value::from("")]))
        );
        assert!(matches!(req.call("Header", &[]), Some(Err(_))));
        assert_eq!(req.call("Cookie", &[]), None);
    }
}
