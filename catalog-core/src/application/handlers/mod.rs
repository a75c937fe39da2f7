//! Command and query handlers plus the dispatch table that binds them.

pub mod brands;
pub mod items;

pub use brands::{CreateCatalogBrandHandler, ReadCatalogBrandsHandler};
pub use items::{
    CreateCatalogItemHandler, DeleteCatalogItemHandler, ReadCatalogItemsHandler,
    ReadSingleCatalogItemHandler, UpdateCatalogItemHandler,
};

use crate::application::{
    commands::{
        CreateCatalogBrandCommand, CreateCatalogItemCommand, DeleteCatalogItemCommand,
        UpdateCatalogItemCommand,
    },
    queries::{ReadCatalogBrandsQuery, ReadCatalogItemsQuery, ReadSingleCatalogItemQuery},
    unit_of_work::CatalogUnitOfWork,
};
use crate::error::Result;
use crate::mediator::{Dispatcher, DispatcherBuilder};

/// Register every catalog handler against `uow`, without building.
///
/// Callers that need to swap one handler (tests, instrumentation) start
/// from [`DispatcherBuilder::new`] instead and call [`expect_catalog_requests`].
pub fn register_catalog_handlers(
    builder: DispatcherBuilder,
    uow: &CatalogUnitOfWork,
) -> DispatcherBuilder {
    builder
        .register::<ReadCatalogItemsQuery, _>(ReadCatalogItemsHandler::new(uow.clone()))
        .register::<ReadSingleCatalogItemQuery, _>(ReadSingleCatalogItemHandler::new(
            uow.clone(),
        ))
        .register::<CreateCatalogItemCommand, _>(CreateCatalogItemHandler::new(uow.clone()))
        .register::<UpdateCatalogItemCommand, _>(UpdateCatalogItemHandler::new(uow.clone()))
        .register::<DeleteCatalogItemCommand, _>(DeleteCatalogItemHandler::new(uow.clone()))
        .register::<ReadCatalogBrandsQuery, _>(ReadCatalogBrandsHandler::new(uow.clone()))
        .register::<CreateCatalogBrandCommand, _>(CreateCatalogBrandHandler::new(uow.clone()))
}

/// Declare every request type the HTTP surface sends.
pub fn expect_catalog_requests(builder: DispatcherBuilder) -> DispatcherBuilder {
    builder
        .expect::<ReadCatalogItemsQuery>()
        .expect::<ReadSingleCatalogItemQuery>()
        .expect::<CreateCatalogItemCommand>()
        .expect::<UpdateCatalogItemCommand>()
        .expect::<DeleteCatalogItemCommand>()
        .expect::<ReadCatalogBrandsQuery>()
        .expect::<CreateCatalogBrandCommand>()
}

/// The validated dispatcher for the catalog service.
pub fn catalog_dispatcher(uow: &CatalogUnitOfWork) -> Result<Dispatcher> {
    let builder = register_catalog_handlers(Dispatcher::builder(), uow);
    expect_catalog_requests(builder).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_model::{
        CatalogBrandId, CatalogItemId, CreateCatalogBrandDto, CreateCatalogItemDto, Decimal,
        PageRequest, UpdateCatalogItemDto,
    };
    use tokio_util::sync::CancellationToken;

    use crate::error::CatalogError;

    fn widget() -> CreateCatalogItemDto {
        CreateCatalogItemDto {
            name: "Widget".to_string(),
            description: None,
            price: Decimal::new(999, 2),
            picture_file_name: None,
            catalog_brand_id: None,
            available_stock: 0,
            restock_threshold: 0,
            max_stock_threshold: 0,
        }
    }

    fn dispatcher() -> (Dispatcher, CatalogUnitOfWork) {
        let uow = CatalogUnitOfWork::in_memory();
        (catalog_dispatcher(&uow).unwrap(), uow)
    }

    #[tokio::test]
    async fn create_then_read_returns_the_same_view() {
        let (dispatcher, _) = dispatcher();
        let cancel = CancellationToken::new();

        let created = dispatcher
            .send(CreateCatalogItemCommand { payload: widget() }, &cancel)
            .await
            .unwrap();
        assert!(created.id.get() > 0);
        assert_eq!(created.name, "Widget");
        assert_eq!(created.price, Decimal::new(999, 2));

        let read = dispatcher
            .send(ReadSingleCatalogItemQuery { id: created.id }, &cancel)
            .await
            .unwrap();
        assert_eq!(read, Some(created));
    }

    #[tokio::test]
    async fn read_single_of_unknown_id_is_none() {
        let (dispatcher, _) = dispatcher();
        let read = dispatcher
            .send(
                ReadSingleCatalogItemQuery {
                    id: CatalogItemId::new(12345).unwrap(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn create_rejects_unknown_brand() {
        let (dispatcher, uow) = dispatcher();
        let cancel = CancellationToken::new();
        let payload = CreateCatalogItemDto {
            catalog_brand_id: Some(CatalogBrandId::new(77).unwrap()),
            ..widget()
        };

        let err = dispatcher
            .send(CreateCatalogItemCommand { payload }, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref m) if m.contains("77")));

        let page = uow
            .items
            .get_all(PageRequest::default(), &cancel)
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn items_carry_their_brand_name() {
        let (dispatcher, _) = dispatcher();
        let cancel = CancellationToken::new();
        let brand = dispatcher
            .send(
                CreateCatalogBrandCommand {
                    payload: CreateCatalogBrandDto {
                        brand: "Acme".to_string(),
                    },
                },
                &cancel,
            )
            .await
            .unwrap();

        let payload = CreateCatalogItemDto {
            catalog_brand_id: Some(brand.id),
            ..widget()
        };
        dispatcher
            .send(CreateCatalogItemCommand { payload }, &cancel)
            .await
            .unwrap();
        dispatcher
            .send(CreateCatalogItemCommand { payload: widget() }, &cancel)
            .await
            .unwrap();

        let page = dispatcher
            .send(ReadCatalogItemsQuery::default(), &cancel)
            .await
            .unwrap();
        let brands: Vec<_> = page.iter().map(|item| item.catalog_brand.as_deref()).collect();
        assert_eq!(brands, [Some("Acme"), None]);
    }

    #[tokio::test]
    async fn update_of_missing_item_is_none_and_mutates_nothing() {
        let (dispatcher, uow) = dispatcher();
        let cancel = CancellationToken::new();

        let outcome = dispatcher
            .send(
                UpdateCatalogItemCommand {
                    id: 404,
                    payload: UpdateCatalogItemDto {
                        name: Some("Ghost".to_string()),
                        ..Default::default()
                    },
                },
                &cancel,
            )
            .await
            .unwrap();
        assert!(outcome.is_none());

        let page = uow
            .items
            .get_all(PageRequest::default(), &cancel)
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let (dispatcher, _) = dispatcher();
        let cancel = CancellationToken::new();
        let created = dispatcher
            .send(CreateCatalogItemCommand { payload: widget() }, &cancel)
            .await
            .unwrap();

        let updated = dispatcher
            .send(
                UpdateCatalogItemCommand {
                    id: created.id.get(),
                    payload: UpdateCatalogItemDto {
                        available_stock: Some(5),
                        ..Default::default()
                    },
                },
                &cancel,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.available_stock, 5);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.price, created.price);
    }

    #[tokio::test]
    async fn update_with_invalid_payload_keeps_the_stored_item() {
        let (dispatcher, _) = dispatcher();
        let cancel = CancellationToken::new();
        let created = dispatcher
            .send(CreateCatalogItemCommand { payload: widget() }, &cancel)
            .await
            .unwrap();

        let err = dispatcher
            .send(
                UpdateCatalogItemCommand {
                    id: created.id.get(),
                    payload: UpdateCatalogItemDto {
                        name: Some("Renamed".to_string()),
                        price: Some(Decimal::new(-1, 0)),
                        ..Default::default()
                    },
                },
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let read = dispatcher
            .send(ReadSingleCatalogItemQuery { id: created.id }, &cancel)
            .await
            .unwrap();
        assert_eq!(read, Some(created));
    }

    #[tokio::test]
    async fn non_positive_ids_are_not_found_for_writes() {
        let (dispatcher, _) = dispatcher();
        let cancel = CancellationToken::new();

        for id in [0, -1, i64::MIN] {
            let updated = dispatcher
                .send(
                    UpdateCatalogItemCommand {
                        id,
                        payload: UpdateCatalogItemDto::default(),
                    },
                    &cancel,
                )
                .await
                .unwrap();
            assert!(updated.is_none());

            let deleted = dispatcher
                .send(DeleteCatalogItemCommand { id }, &cancel)
                .await
                .unwrap();
            assert!(!deleted);
        }
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let (dispatcher, _) = dispatcher();
        let cancel = CancellationToken::new();
        let created = dispatcher
            .send(CreateCatalogItemCommand { payload: widget() }, &cancel)
            .await
            .unwrap();

        let first = dispatcher
            .send(DeleteCatalogItemCommand { id: created.id.get() }, &cancel)
            .await
            .unwrap();
        let second = dispatcher
            .send(DeleteCatalogItemCommand { id: created.id.get() }, &cancel)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn brand_names_are_validated() {
        let (dispatcher, _) = dispatcher();
        let err = dispatcher
            .send(
                CreateCatalogBrandCommand {
                    payload: CreateCatalogBrandDto {
                        brand: "   ".to_string(),
                    },
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn registering_twice_fails_the_build() {
        let uow = CatalogUnitOfWork::in_memory();
        let builder = register_catalog_handlers(Dispatcher::builder(), &uow)
            .register::<DeleteCatalogItemCommand, _>(DeleteCatalogItemHandler::new(uow.clone()));

        let err = expect_catalog_requests(builder).build().unwrap_err();
        assert!(
            matches!(err, CatalogError::Configuration(ref m) if m.contains("DeleteCatalogItemCommand"))
        );
    }
}
