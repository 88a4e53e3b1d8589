//! Item route handlers
//!
//! Each handler makes at most one store call and turns the outcome into a
//! `Reply` or an `ApiError`. Path and body parsing happen before these run.

use hyper::StatusCode;
use serde::Serialize;

use super::error::ApiError;
use crate::store::{Item, ItemFields, ItemStore};

/// Successful JSON payloads
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReplyBody {
    Item(Item),
    Items(Vec<Item>),
    Deleted { message: &'static str, item: Item },
}

/// A successful outcome: status plus payload
#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

impl Reply {
    const fn ok(body: ReplyBody) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

/// `GET /items`
pub fn list_items(store: &dyn ItemStore) -> Result<Reply, ApiError> {
    Ok(Reply::ok(ReplyBody::Items(store.list_all()?)))
}

/// `GET /items/:id`
pub fn get_item(store: &dyn ItemStore, id: i64) -> Result<Reply, ApiError> {
    let item = store.get_by_id(id)?.ok_or(ApiError::ItemNotFound)?;
    Ok(Reply::ok(ReplyBody::Item(item)))
}

/// `POST /items`
pub fn create_item(store: &dyn ItemStore, fields: ItemFields) -> Result<Reply, ApiError> {
    let item = store.insert(fields)?;
    Ok(Reply {
        status: StatusCode::CREATED,
        body: ReplyBody::Item(item),
    })
}

/// `PUT /items/:id`
pub fn update_item(store: &dyn ItemStore, id: i64, fields: ItemFields) -> Result<Reply, ApiError> {
    let item = store.update(id, fields)?.ok_or(ApiError::ItemNotFound)?;
    Ok(Reply::ok(ReplyBody::Item(item)))
}

/// `DELETE /items/:id`
pub fn delete_item(store: &dyn ItemStore, id: i64) -> Result<Reply, ApiError> {
    let item = store.delete_by_id(id)?.ok_or(ApiError::ItemNotFound)?;
    Ok(Reply::ok(ReplyBody::Deleted {
        message: "Item deleted",
        item,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryItemStore;
    use serde_json::json;

    fn fields(name: &str) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            description: format!("{name} description"),
        }
    }

    #[test]
    fn test_create_returns_201() {
        let store = MemoryItemStore::new();
        let reply = create_item(&store, fields("a")).unwrap();
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.body, ReplyBody::Item(fields("a").into_item(1)));
    }

    #[test]
    fn test_missing_item_is_not_found() {
        let store = MemoryItemStore::new();
        assert!(matches!(get_item(&store, 1), Err(ApiError::ItemNotFound)));
        assert!(matches!(update_item(&store, 1, fields("a")), Err(ApiError::ItemNotFound)));
        assert!(matches!(delete_item(&store, 999), Err(ApiError::ItemNotFound)));
    }

    #[test]
    fn test_deleted_body_shape() {
        let store = MemoryItemStore::new();
        create_item(&store, fields("a")).unwrap();
        let reply = delete_item(&store, 1).unwrap();
        assert_eq!(
            serde_json::to_value(&reply.body).unwrap(),
            json!({
                "message": "Item deleted",
                "item": {"id": 1, "name": "a", "description": "a description"}
            })
        );
    }

    #[test]
    fn test_storage_failure_propagates() {
        let store = MemoryItemStore::new();
        store.dispose().unwrap();
        assert!(matches!(list_items(&store), Err(ApiError::Storage(_))));
    }
}
