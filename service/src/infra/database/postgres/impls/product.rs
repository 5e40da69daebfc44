//! [`Product`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{media, product, Product},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `products` table in the order [`from_row()`] expects them.
const COLUMNS: &str = "\
    id, title, description, price, discount, \
    image_url, image_path, \
    created_at, updated_at";

/// Reconstructs a [`Product`] from the provided [`Row`].
fn from_row(row: &Row) -> Product {
    let image_url: Option<media::Url> = row.get("image_url");
    let image_path: Option<media::Path> = row.get("image_path");
    Product {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        price: row.get("price"),
        discount: row.get("discount"),
        image: image_url
            .zip(image_path)
            .map(|(url, path)| media::Image { url, path }),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Database<Select<By<Vec<Product>, ()>>> for Postgres {
    type Ok = Vec<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Product>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM products \
             ORDER BY created_at DESC, id",
        );
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl Database<Select<By<Option<Product>, product::Id>>> for Postgres {
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Product>, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: product::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM products \
             WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl Database<Insert<Product>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(product): Insert<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let Product {
            id,
            title,
            description,
            price,
            discount,
            image,
            created_at,
            updated_at,
        } = product;
        let (image_url, image_path) =
            image.map(|i| (i.url, i.path)).unzip();

        const SQL: &str = "\
            INSERT INTO products (\
                id, title, description, price, discount, \
                image_url, image_path, \
                created_at, updated_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::TEXT, $4::NUMERIC, $5::NUMERIC, \
                $6::TEXT, $7::TEXT, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &price,
                &discount,
                &image_url,
                &image_path,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Update<Product>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(product): Update<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let Product {
            id,
            title,
            description,
            price,
            discount,
            image,
            created_at: _,
            updated_at,
        } = product;
        let (image_url, image_path) =
            image.map(|i| (i.url, i.path)).unzip();

        const SQL: &str = "\
            UPDATE products \
            SET title = $2::VARCHAR, \
                description = $3::TEXT, \
                price = $4::NUMERIC, \
                discount = $5::NUMERIC, \
                image_url = $6::TEXT, \
                image_path = $7::TEXT, \
                updated_at = $8::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &price,
                &discount,
                &image_url,
                &image_path,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Delete<By<Product, product::Id>>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Product, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: product::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM products \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
