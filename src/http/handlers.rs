//! Request handlers and their JSON bodies.
//!
//! Store calls are synchronous SQLite work, so every handler hops onto the
//! blocking pool before touching the service.

use axum::body::{Body, Bytes};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, Path, Request, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::service::{ServiceError, ServiceResult, TreeService};
use crate::storage::NodeId;
use crate::tree::{NewTreeItem, TreeItem, TreeNode, TreeTooDeepError, MAX_TREE_DEPTH};

pub const REPLACED_MESSAGE: &str = "Tree replaced successfully";
pub const UPDATED_MESSAGE: &str = "Data updated successfully";
pub const DELETED_MESSAGE: &str = "Item and children deleted successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceResponse {
    pub message: String,
    pub root_id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDataRequest {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDataResponse {
    pub item_id: NodeId,
    pub data: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub item_id: NodeId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `POST /api/tree`.
///
/// The nesting of the raw document is checked before it is parsed, so a tree
/// deeper than [`MAX_TREE_DEPTH`] is a 422 however deep it goes. Each tree
/// level is one object plus one `children` array.
#[derive(Debug)]
pub struct TreeBody(pub NewTreeItem);

impl<S> FromRequest<S> for TreeBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = Bytes::from_request(Request::new(body), state).await?;
        if nesting_depth(&bytes) > 2 * MAX_TREE_DEPTH {
            let err = TreeTooDeepError {
                max: MAX_TREE_DEPTH,
            };
            return Err(ServiceError::from(err).into());
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let Json(item) = Json::<NewTreeItem>::from_request(req, state).await?;
        Ok(Self(item))
    }
}

/// Deepest `{`/`[` nesting in a JSON document. Brackets inside strings
/// don't count.
fn nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    let mut in_string = false;
    let mut escaped = false;
    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

async fn run_blocking<F, T>(service: TreeService, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&TreeService) -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(result?)
}

/// `GET /api/tree`
pub async fn get_tree(State(service): State<TreeService>) -> Result<Json<Vec<TreeItem>>, ApiError> {
    let forest = run_blocking(service, TreeService::get_tree).await?;
    Ok(Json(forest))
}

/// `GET /api/tree/all`
pub async fn get_all_items(
    State(service): State<TreeService>,
) -> Result<Json<Vec<TreeNode>>, ApiError> {
    let rows = run_blocking(service, TreeService::get_flat_items).await?;
    Ok(Json(rows))
}

/// `GET /api/tree/{id}`
pub async fn get_subtree(
    State(service): State<TreeService>,
    id: Result<Path<NodeId>, PathRejection>,
) -> Result<Json<TreeItem>, ApiError> {
    let Path(id) = id?;
    let subtree = run_blocking(service, move |service| service.get_subtree(id)).await?;
    Ok(Json(subtree))
}

/// `POST /api/tree`
pub async fn replace_tree(
    State(service): State<TreeService>,
    TreeBody(input): TreeBody,
) -> Result<Json<ReplaceResponse>, ApiError> {
    let root_id = run_blocking(service, move |service| service.replace_tree(&input)).await?;
    Ok(Json(ReplaceResponse {
        message: REPLACED_MESSAGE.to_string(),
        root_id,
    }))
}

/// `PUT /api/tree/{id}/data`
pub async fn update_data(
    State(service): State<TreeService>,
    id: Result<Path<NodeId>, PathRejection>,
    payload: Result<Json<UpdateDataRequest>, JsonRejection>,
) -> Result<Json<UpdateDataResponse>, ApiError> {
    let Path(id) = id?;
    let Json(UpdateDataRequest { data }) = payload?;
    let data = run_blocking(service, move |service| {
        service.update_node_data(id, &data)?;
        Ok(data)
    })
    .await?;
    Ok(Json(UpdateDataResponse {
        item_id: id,
        data,
        message: UPDATED_MESSAGE.to_string(),
    }))
}

/// `DELETE /api/tree/{id}`
pub async fn delete_node(
    State(service): State<TreeService>,
    id: Result<Path<NodeId>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;
    run_blocking(service, move |service| service.delete_node(id)).await?;
    Ok(Json(DeleteResponse {
        item_id: id,
        message: DELETED_MESSAGE.to_string(),
    }))
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_depth() {
        assert_eq!(nesting_depth(b"\"flat\""), 0);
        assert_eq!(nesting_depth(br#"{"name": "a", "children": [{"name": "b"}]}"#), 3);
        assert_eq!(nesting_depth(br#"[{}, {}, [[]]]"#), 3);
        // brackets and escaped quotes inside strings are text
        assert_eq!(nesting_depth(br#"{"name": "[[{\"[[", "data": "]}"}"#), 1);
    }
}
