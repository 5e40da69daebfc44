//! [`Project`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{media, project, Project},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Reconstructs a [`Project`] without its images from the provided [`Row`].
fn project_from_row(row: &Row) -> Project {
    Project {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        location: row.get("location"),
        completed_date: row.get("completed_date"),
        client: row.get("client"),
        category: row.get("category"),
        duration: row.get("duration"),
        images: vec![],
        created_at: row.get("created_at"),
    }
}

/// Reconstructs a [`project::Image`] from the provided [`Row`].
fn image_from_row(row: &Row) -> project::Image {
    project::Image {
        id: row.get("id"),
        project_id: row.get("project_id"),
        media: media::Image {
            url: row.get("image_url"),
            path: row.get("image_path"),
        },
        created_at: row.get("created_at"),
    }
}

impl Postgres {
    /// Loads the images of the provided [`Project`]s, keeping their upload
    /// order.
    async fn attach_images(
        &self,
        projects: &mut [Project],
    ) -> Result<(), Traced<database::Error>> {
        if projects.is_empty() {
            return Ok(());
        }
        let ids = projects.iter().map(|p| p.id).collect::<Vec<_>>();

        const SQL: &str = "\
            SELECT id, project_id, image_url, image_path, created_at \
            FROM project_images \
            WHERE project_id = ANY($1::UUID[]) \
            ORDER BY created_at, id";
        let mut images = HashMap::<project::Id, Vec<project::Image>>::new();
        for row in self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
        {
            let image = image_from_row(&row);
            images.entry(image.project_id).or_default().push(image);
        }

        for project in projects {
            project.images = images.remove(&project.id).unwrap_or_default();
        }
        Ok(())
    }
}

impl Database<Select<By<Vec<Project>, ()>>> for Postgres {
    type Ok = Vec<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Project>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, title, description, location, completed_date, \
                   client, category, duration, created_at \
            FROM projects \
            ORDER BY completed_date DESC, created_at DESC, id";
        let mut projects = self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(project_from_row)
            .collect::<Vec<_>>();

        self.attach_images(&mut projects)
            .await
            .map_err(tracerr::wrap!())?;
        Ok(projects)
    }
}

impl Database<Select<By<Option<Project>, project::Id>>> for Postgres {
    type Ok = Option<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Project>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: project::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, title, description, location, completed_date, \
                   client, category, duration, created_at \
            FROM projects \
            WHERE id = $1::UUID";
        let Some(row) = self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let mut projects = [project_from_row(&row)];
        self.attach_images(&mut projects)
            .await
            .map_err(tracerr::wrap!())?;
        let [project] = projects;
        Ok(Some(project))
    }
}

impl Database<Insert<Project>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    /// Inserts the [`Project`] row only: its images are inserted one by one
    /// as they are uploaded.
    async fn execute(
        &self,
        Insert(project): Insert<Project>,
    ) -> Result<Self::Ok, Self::Err> {
        let Project {
            id,
            title,
            description,
            location,
            completed_date,
            client,
            category,
            duration,
            images: _,
            created_at,
        } = project;

        const SQL: &str = "\
            INSERT INTO projects (\
                id, title, description, location, completed_date, \
                client, category, duration, created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::TEXT, $4::VARCHAR, $5::DATE, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, $9::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &location,
                &completed_date,
                &client,
                &category,
                &duration,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Insert<project::Image>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<project::Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let project::Image {
            id,
            project_id,
            media: media::Image { url, path },
            created_at,
        } = image;

        const SQL: &str = "\
            INSERT INTO project_images (\
                id, project_id, image_url, image_path, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::TEXT, $4::TEXT, $5::TIMESTAMPTZ \
            )";
        self.exec(SQL, &[&id, &project_id, &url, &path, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl Database<Delete<By<Project, project::Id>>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    /// Deletes the [`Project`] along with all its image rows in a single
    /// statement.
    async fn execute(
        &self,
        Delete(by): Delete<By<Project, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: project::Id = by.into_inner();

        const SQL: &str = "\
            WITH images AS (\
                DELETE FROM project_images \
                WHERE project_id = $1::UUID \
            ) \
            DELETE FROM projects \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
