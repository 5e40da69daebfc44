//! [`media`]-related [`Database`] implementations.

use std::collections::HashSet;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::media,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl Database<Select<By<read::media::ReferencedPaths, media::Bucket>>>
    for Postgres
{
    type Ok = read::media::ReferencedPaths;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::media::ReferencedPaths, media::Bucket>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = match by.into_inner() {
            media::Bucket::Products => {
                "SELECT image_path \
                 FROM products \
                 WHERE image_path IS NOT NULL"
            }
            media::Bucket::Projects => {
                "SELECT image_path \
                 FROM project_images"
            }
        };
        Ok(read::media::ReferencedPaths(
            self.query(sql, &[])
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(|row| row.get("image_path"))
                .collect::<HashSet<_>>(),
        ))
    }
}
