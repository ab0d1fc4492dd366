use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema, SimpleObject,
};
use platform_api::{ApiError, internal_error};
use platform_directory::EmployeeSource;
use products_roster::{Designation, Role, RoleDirectory, RosterEntry, RosterQuery, Visibility};
use serde::Serialize;
use tracing::instrument;

pub type SchemaType = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Shared state injected into every GraphQL request.
#[derive(Clone)]
pub struct GraphqlData {
    pub directory: Arc<RoleDirectory>,
    pub source: Arc<dyn EmployeeSource>,
}

pub fn build_schema(data: GraphqlData) -> SchemaType {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(data)
        .finish()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> HealthPayload {
        HealthPayload { ok: true }
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    #[instrument(name = "graphql.roles", skip_all)]
    async fn roles(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<RoleNode>> {
        let data = graphql_data(ctx)?;
        Ok(Role::ALL
            .into_iter()
            .map(|role| RoleNode::describe(&data.directory, role))
            .collect())
    }

    #[instrument(name = "graphql.role", skip(self, ctx))]
    async fn role(&self, ctx: &Context<'_>, name: String) -> async_graphql::Result<RoleNode> {
        let data = graphql_data(ctx)?;
        let role = name
            .parse::<Role>()
            .map_err(|err| ApiError::from(err).extend())?;
        Ok(RoleNode::describe(&data.directory, role))
    }

    #[instrument(name = "graphql.roster", skip(self, ctx))]
    async fn roster(
        &self,
        ctx: &Context<'_>,
        viewer: String,
        q: Option<String>,
        approved_only: Option<bool>,
    ) -> async_graphql::Result<Vec<EmployeeNode>> {
        let data = graphql_data(ctx)?;
        let employees = data
            .source
            .list_employees()
            .await
            .map_err(|err| ApiError::from(err).extend())?;
        let query = RosterQuery {
            search: q,
            approved_only: approved_only.unwrap_or(false),
        };
        let viewer = Designation::parse(&viewer);
        Ok(data
            .directory
            .roster(&viewer, &employees, &query)
            .into_iter()
            .map(EmployeeNode::from)
            .collect())
    }

    #[instrument(name = "graphql.table_issues", skip_all)]
    async fn table_issues(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        let data = graphql_data(ctx)?;
        Ok(data
            .directory
            .audit()
            .iter()
            .map(ToString::to_string)
            .collect())
    }
}

fn graphql_data<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a GraphqlData> {
    ctx.data::<GraphqlData>()
        .map_err(|_| internal_error(anyhow::anyhow!("missing GraphQL data")))
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct RoleNode {
    pub name: String,
    pub superiors: Vec<String>,
    pub subordinates: Vec<String>,
    /// Null when the role sees every employee.
    pub visible_roles: Option<Vec<String>>,
    pub sees_all: bool,
}

impl RoleNode {
    fn describe(directory: &RoleDirectory, role: Role) -> Self {
        let entry = directory.hierarchy.lookup(role);
        let visible_roles = match directory.visibility.lookup(role) {
            Visibility::All => None,
            Visibility::Only(roles) => Some(labels(roles)),
        };
        Self {
            name: role.as_str().to_string(),
            superiors: labels(&entry.superiors),
            subordinates: labels(&entry.subordinates),
            sees_all: visible_roles.is_none(),
            visible_roles,
        }
    }
}

fn labels<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Vec<String> {
    roles.into_iter().map(|role| role.as_str().to_string()).collect()
}

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeNode {
    pub id: String,
    pub full_name: String,
    pub designation: String,
    pub is_approved: bool,
    /// 1 superior, 2 peer, 3 subordinate, 4 unrelated.
    pub priority: u8,
}

impl From<RosterEntry> for EmployeeNode {
    fn from(entry: RosterEntry) -> Self {
        Self {
            id: entry.employee.id.to_string(),
            full_name: entry.employee.full_name,
            designation: entry.employee.designation.to_string(),
            is_approved: entry.employee.is_approved,
            priority: entry.priority.rank(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Request;
    use platform_directory::StaticDirectory;
    use products_roster::EmployeeRecord;
    use serde_json::json;

    fn schema() -> SchemaType {
        let staff = vec![
            EmployeeRecord::new(1_i64, "Gopal", Role::Groom, true),
            EmployeeRecord::new(2_i64, "Dina", Role::Director, true),
            EmployeeRecord::new(3_i64, "Suresh", Role::StableManager, false),
            EmployeeRecord::new(4_i64, "Gita", Role::Guard, true),
        ];
        build_schema(GraphqlData {
            directory: Arc::new(RoleDirectory::standard()),
            source: Arc::new(StaticDirectory::new(staff)),
        })
    }

    #[tokio::test]
    async fn health_query_returns_ok() {
        let response = schema().execute(Request::new("{ health { ok } }")).await;
        assert!(response.errors.is_empty());
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"health": {"ok": true}}));
    }

    #[tokio::test]
    async fn roster_query_filters_and_orders() {
        let response = schema()
            .execute(Request::new(
                r#"{ roster(viewer: "stable manager") { fullName designation isApproved priority } }"#,
            ))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(
            body,
            json!({"roster": [
                {"fullName": "Suresh", "designation": "Stable Manager", "isApproved": false, "priority": 2},
                {"fullName": "Dina", "designation": "Director", "isApproved": true, "priority": 1},
                {"fullName": "Gopal", "designation": "Groom", "isApproved": true, "priority": 3}
            ]})
        );
    }

    #[tokio::test]
    async fn role_query_describes_visibility() {
        let response = schema()
            .execute(Request::new(
                r#"{ farrier: role(name: "Farrier") { superiors visibleRoles seesAll }
                     director: role(name: "Director") { visibleRoles seesAll } }"#,
            ))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(
            body["farrier"],
            json!({
                "superiors": ["Super Admin", "Director", "Stable Manager"],
                "visibleRoles": ["Stable Manager", "Farrier"],
                "seesAll": false
            })
        );
        assert_eq!(body["director"], json!({"visibleRoles": null, "seesAll": true}));
    }

    #[tokio::test]
    async fn unknown_role_reports_code() {
        let response = schema()
            .execute(Request::new(r#"{ role(name: "Vet") { name } }"#))
            .await;
        assert_eq!(response.errors.len(), 1);
        let code = response.errors[0]
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("UNKNOWN_ROLE")));
    }

    #[tokio::test]
    async fn standard_tables_have_no_issues() {
        let response = schema().execute(Request::new("{ tableIssues }")).await;
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"tableIssues": []}));
    }
}
