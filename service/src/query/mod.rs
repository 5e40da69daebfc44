//! [`Query`] definition.

pub mod products;
pub mod projects;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, St, Pay, Ml, W, B> Query<DatabaseQuery<By<W, B>>>
    for Service<Db, St, Pay, Ml>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{
        operations::{Insert, Update},
        Percent,
    };

    use crate::{
        domain::product,
        infra::Database as _,
        query::{products, Query as _},
        spec::{new_product, service},
    };

    #[tokio::test]
    async fn lists_products_newest_first() {
        let (svc, _) = service();
        let older = new_product("Gerüst A");
        let newer = product::Product {
            created_at: older.created_at + std::time::Duration::from_secs(1),
            ..new_product("Gerüst B")
        };
        svc.database().execute(Insert(older.clone())).await.unwrap();
        svc.database().execute(Insert(newer.clone())).await.unwrap();

        let list = svc.execute(products::List::by(())).await.unwrap();

        assert_eq!(
            list.iter().map(|p| p.id).collect::<Vec<_>>(),
            [newer.id, older.id],
        );
    }

    #[tokio::test]
    async fn reads_last_written_product() {
        let (svc, _) = service();
        let mut product = new_product("Gerüst A");
        svc.database().execute(Insert(product.clone())).await.unwrap();
        product.discount = Percent::from_str("50").unwrap();
        svc.database().execute(Update(product.clone())).await.unwrap();

        let read = svc
            .execute(products::ById::by(product.id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(read.effective_price().to_string(), "5.00");
        assert!(svc
            .execute(products::ById::by(product::Id::new()))
            .await
            .unwrap()
            .is_none());
    }
}
