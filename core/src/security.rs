#![deny(missing_docs)]

//! # Security Schemes
//!
//! Validates the configured `securitySchemes` against the shapes this generator
//! recognizes and renders them back into OpenAPI security scheme objects.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Where an API key is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    /// Request header.
    Header,
    /// Query string.
    Query,
    /// Cookie.
    Cookie,
}

impl ApiKeyLocation {
    fn as_str(self) -> &'static str {
        match self {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

/// A single OAuth2 flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    /// Authorization endpoint.
    #[serde(default)]
    pub authorization_url: Option<String>,
    /// Token endpoint.
    #[serde(default)]
    pub token_url: Option<String>,
    /// Refresh endpoint.
    #[serde(default)]
    pub refresh_url: Option<String>,
    /// Scope name to description.
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}

/// The supported OAuth2 flows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    /// Authorization code flow.
    #[serde(default)]
    pub authorization_code: Option<OAuthFlow>,
    /// Implicit flow.
    #[serde(default)]
    pub implicit: Option<OAuthFlow>,
    /// Password flow.
    #[serde(default)]
    pub password: Option<OAuthFlow>,
    /// Client credentials flow.
    #[serde(default)]
    pub client_credentials: Option<OAuthFlow>,
}

/// A recognized security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityScheme {
    /// HTTP basic authentication.
    HttpBasic,
    /// HTTP bearer token.
    HttpBearer {
        /// Token format hint (e.g. `JWT`).
        bearer_format: Option<String>,
    },
    /// API key in a header, query parameter or cookie.
    ApiKey {
        /// Parameter name.
        name: String,
        /// Location.
        location: ApiKeyLocation,
    },
    /// OAuth2.
    OAuth2 {
        /// Description.
        description: Option<String>,
        /// Flows.
        flows: OAuthFlows,
    },
    /// OpenID Connect discovery.
    OpenIdConnect {
        /// Discovery URL.
        open_id_connect_url: String,
    },
}

#[derive(Deserialize)]
struct HttpShape {
    scheme: String,
    #[serde(default, rename = "bearerFormat")]
    bearer_format: Option<String>,
}

#[derive(Deserialize)]
struct ApiKeyShape {
    name: String,
    #[serde(rename = "in")]
    location: ApiKeyLocation,
}

#[derive(Deserialize)]
struct OAuth2Shape {
    #[serde(default)]
    description: Option<String>,
    flows: OAuthFlows,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenIdConnectShape {
    open_id_connect_url: String,
}

impl SecurityScheme {
    /// Parses one configured scheme.
    pub fn from_value(name: &str, value: &Value) -> AppResult<Self> {
        let ty = value.get("type").and_then(Value::as_str).ok_or_else(|| {
            AppError::Configuration(format!("Security scheme '{}' is missing a \"type\"", name))
        })?;

        match ty {
            "http" => {
                let shape: HttpShape = parse_shape(name, value)?;
                match shape.scheme.as_str() {
                    "basic" => Ok(SecurityScheme::HttpBasic),
                    "bearer" => Ok(SecurityScheme::HttpBearer {
                        bearer_format: shape.bearer_format,
                    }),
                    other => Err(AppError::Configuration(format!(
                        "Security scheme '{}' has unsupported http scheme '{}'",
                        name, other
                    ))),
                }
            }
            "apiKey" => {
                let shape: ApiKeyShape = parse_shape(name, value)?;
                Ok(SecurityScheme::ApiKey {
                    name: shape.name,
                    location: shape.location,
                })
            }
            "oauth2" => {
                let shape: OAuth2Shape = parse_shape(name, value)?;
                Ok(SecurityScheme::OAuth2 {
                    description: shape.description,
                    flows: shape.flows,
                })
            }
            "openIdConnect" => {
                let shape: OpenIdConnectShape = parse_shape(name, value)?;
                Ok(SecurityScheme::OpenIdConnect {
                    open_id_connect_url: shape.open_id_connect_url,
                })
            }
            other => Err(AppError::Configuration(format!(
                "Security scheme '{}' has unrecognized type '{}'",
                name, other
            ))),
        }
    }

    /// Renders the OpenAPI security scheme object.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        match self {
            SecurityScheme::HttpBasic => {
                obj.insert("type".to_string(), json!("http"));
                obj.insert("scheme".to_string(), json!("basic"));
            }
            SecurityScheme::HttpBearer { bearer_format } => {
                obj.insert("type".to_string(), json!("http"));
                obj.insert("scheme".to_string(), json!("bearer"));
                if let Some(fmt) = bearer_format {
                    obj.insert("bearerFormat".to_string(), json!(fmt));
                }
            }
            SecurityScheme::ApiKey { name, location } => {
                obj.insert("type".to_string(), json!("apiKey"));
                obj.insert("in".to_string(), json!(location.as_str()));
                obj.insert("name".to_string(), json!(name));
            }
            SecurityScheme::OAuth2 { description, flows } => {
                obj.insert("type".to_string(), json!("oauth2"));
                if let Some(desc) = description {
                    obj.insert("description".to_string(), json!(desc));
                }
                obj.insert("flows".to_string(), oauth_flows_value(flows));
            }
            SecurityScheme::OpenIdConnect {
                open_id_connect_url,
            } => {
                obj.insert("type".to_string(), json!("openIdConnect"));
                obj.insert("openIdConnectUrl".to_string(), json!(open_id_connect_url));
            }
        }
        Value::Object(obj)
    }
}

fn parse_shape<T: DeserializeOwned>(name: &str, value: &Value) -> AppResult<T> {
    T::deserialize(value).map_err(|e| {
        AppError::Configuration(format!("Security scheme '{}' is invalid: {}", name, e))
    })
}

fn oauth_flows_value(flows: &OAuthFlows) -> Value {
    let mut map = Map::new();
    if let Some(flow) = flows.authorization_code.as_ref() {
        map.insert("authorizationCode".to_string(), oauth_flow_value(flow));
    }
    if let Some(flow) = flows.implicit.as_ref() {
        map.insert("implicit".to_string(), oauth_flow_value(flow));
    }
    if let Some(flow) = flows.password.as_ref() {
        map.insert("password".to_string(), oauth_flow_value(flow));
    }
    if let Some(flow) = flows.client_credentials.as_ref() {
        map.insert("clientCredentials".to_string(), oauth_flow_value(flow));
    }
    Value::Object(map)
}

fn oauth_flow_value(flow: &OAuthFlow) -> Value {
    let mut map = Map::new();
    if let Some(url) = &flow.authorization_url {
        map.insert("authorizationUrl".to_string(), json!(url));
    }
    if let Some(url) = &flow.token_url {
        map.insert("tokenUrl".to_string(), json!(url));
    }
    if let Some(url) = &flow.refresh_url {
        map.insert("refreshUrl".to_string(), json!(url));
    }
    map.insert("scopes".to_string(), json!(flow.scopes));
    Value::Object(map)
}

/// Parses every configured scheme, preserving configuration order.
pub fn parse_security_schemes(
    raw: &IndexMap<String, Value>,
) -> AppResult<IndexMap<String, SecurityScheme>> {
    raw.iter()
        .map(|(name, value)| Ok((name.clone(), SecurityScheme::from_value(name, value)?)))
        .collect()
}

/// Document-level requirement: any one of the schemes, no particular scopes.
pub fn any_of_requirement(schemes: &IndexMap<String, SecurityScheme>) -> Value {
    Value::Array(
        schemes
            .keys()
            .map(|name| json!({ name.as_str(): [] }))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_shapes() {
        let basic =
            SecurityScheme::from_value("basic", &json!({ "type": "http", "scheme": "basic" }));
        assert_eq!(basic.unwrap(), SecurityScheme::HttpBasic);

        let bearer = SecurityScheme::from_value(
            "bearer",
            &json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }),
        )
        .unwrap();
        assert_eq!(
            bearer.to_value(),
            json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" })
        );

        let api_key = SecurityScheme::from_value(
            "key",
            &json!({ "type": "apiKey", "in": "cookie", "name": "session" }),
        )
        .unwrap();
        assert_eq!(
            api_key.to_value(),
            json!({ "type": "apiKey", "in": "cookie", "name": "session" })
        );

        let oidc = SecurityScheme::from_value(
            "oidc",
            &json!({ "type": "openIdConnect", "openIdConnectUrl": "https://id.example.com" }),
        )
        .unwrap();
        assert_eq!(oidc.to_value()["openIdConnectUrl"], "https://id.example.com");
    }

    #[test]
    fn test_oauth2_flows() {
        let raw = json!({
            "type": "oauth2",
            "description": "OAuth",
            "flows": {
                "clientCredentials": {
                    "tokenUrl": "https://auth.example.com/token",
                    "scopes": { "read": "Read access" }
                }
            }
        });
        let scheme = SecurityScheme::from_value("oauth", &raw).unwrap();
        let value = scheme.to_value();
        assert_eq!(
            value["flows"]["clientCredentials"]["tokenUrl"],
            "https://auth.example.com/token"
        );
        assert_eq!(value["flows"]["clientCredentials"]["scopes"]["read"], "Read access");
    }

    #[test]
    fn test_unrecognized_type_is_configuration_error() {
        let err = SecurityScheme::from_value("tls", &json!({ "type": "mutualTLS" })).unwrap_err();
        assert!(matches!(err, AppError::Configuration(msg) if msg.contains("mutualTLS")));

        let err =
            SecurityScheme::from_value("digest", &json!({ "type": "http", "scheme": "digest" }));
        assert!(matches!(err, Err(AppError::Configuration(_))));

        let err = SecurityScheme::from_value(
            "key",
            &json!({ "type": "apiKey", "in": "body", "name": "k" }),
        );
        assert!(matches!(err, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_any_of_requirement() {
        let mut raw = IndexMap::new();
        raw.insert("bearer".to_string(), json!({ "type": "http", "scheme": "bearer" }));
        raw.insert("key".to_string(), json!({ "type": "apiKey", "in": "header", "name": "X-Key" }));
        let schemes = parse_security_schemes(&raw).unwrap();

        assert_eq!(
            any_of_requirement(&schemes),
            json!([{ "bearer": [] }, { "key": [] }])
        );
    }
}
