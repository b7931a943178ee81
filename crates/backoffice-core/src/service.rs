// ── Resource service seam ──
//
// The controller talks to the backend through this trait so it can be
// driven by a scripted fake in tests. `ResourceClient<R>` is the real
// implementation.

use std::future::Future;

use backoffice_api::{
    Envelope, Error as ApiError, ListFilter, Page, Resource, ResourceClient, ResourceId,
};

/// CRUD operations for one resource family.
pub trait ResourceService: Send + Sync + 'static {
    type Item: Resource;

    fn list(
        &self,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Envelope<Page<Self::Item>>, ApiError>> + Send;

    fn get_by_id(
        &self,
        id: &ResourceId,
    ) -> impl Future<Output = Result<Envelope<Self::Item>, ApiError>> + Send;

    fn create(
        &self,
        draft: &<Self::Item as Resource>::Draft,
    ) -> impl Future<Output = Result<Envelope<Self::Item>, ApiError>> + Send;

    fn delete(&self, id: &ResourceId)
    -> impl Future<Output = Result<Envelope<()>, ApiError>> + Send;
}

impl<R: Resource> ResourceService for ResourceClient<R> {
    type Item = R;

    fn list(
        &self,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Envelope<Page<R>>, ApiError>> + Send {
        ResourceClient::list(self, filter)
    }

    fn get_by_id(
        &self,
        id: &ResourceId,
    ) -> impl Future<Output = Result<Envelope<R>, ApiError>> + Send {
        ResourceClient::get_by_id(self, id)
    }

    fn create(
        &self,
        draft: &R::Draft,
    ) -> impl Future<Output = Result<Envelope<R>, ApiError>> + Send {
        ResourceClient::create(self, draft)
    }

    fn delete(
        &self,
        id: &ResourceId,
    ) -> impl Future<Output = Result<Envelope<()>, ApiError>> + Send {
        ResourceClient::delete(self, id)
    }
}
