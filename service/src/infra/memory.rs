//! In-memory implementation of [`Database`], [`Storage`], [`Payments`] and
//! [`Mailer`].

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use common::operations::{By, Delete, Deliver, Insert, Select, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{
        contact::Mail,
        media,
        payment::{
            self, CheckoutSession, NewCheckoutSession, NewPaymentIntent,
            PaymentIntent,
        },
        product, project, Product, Project,
    },
    infra::{
        database, mailer, payments, storage, Database, Mailer, Payments,
        Storage,
    },
    read,
};

/// In-memory backend holding the whole state in a shared map.
///
/// Clones share the same state, so a single [`Memory`] may serve as every
/// infrastructure dependency of a service at once.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Shared [`State`] of this [`Memory`].
    state: Arc<Mutex<State>>,
}

/// Failures to be injected into [`Memory`] operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Faults {
    /// Number of uploads to succeed before every next one fails.
    ///
    /// [`None`] means uploads never fail.
    pub uploads_left: Option<usize>,

    /// Whether removing stored files fails.
    pub removals: bool,

    /// Whether writing to the database fails.
    pub database_writes: bool,

    /// Number of e-mails to be delivered before every next one fails.
    ///
    /// [`None`] means deliveries never fail.
    pub mails_left: Option<usize>,
}

/// State of a [`Memory`] backend.
#[derive(Debug, Default)]
struct State {
    /// Stored [`Product`]s.
    products: HashMap<product::Id, Product>,

    /// Stored [`Project`]s without their images.
    projects: HashMap<project::Id, Project>,

    /// Stored [`project::Image`]s in insertion order.
    project_images: Vec<project::Image>,

    /// Stored files.
    objects: HashMap<(media::Bucket, media::Path), Object>,

    /// Created [`PaymentIntent`]s.
    intents: HashMap<payment::IntentId, PaymentIntent>,

    /// Number of created [`CheckoutSession`]s.
    sessions: usize,

    /// Delivered [`Mail`]s in delivery order.
    mails: Vec<Mail>,

    /// Injected [`Faults`].
    faults: Faults,
}

/// File stored in a [`Memory`] backend.
#[derive(Clone, Debug)]
struct Object {
    /// Content of this [`Object`].
    bytes: Bytes,

    /// [`media::CreationDateTime`] of this [`Object`].
    created_at: media::CreationDateTime,
}

impl Memory {
    /// Creates a new empty [`Memory`] backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects the provided [`Faults`] into this [`Memory`] backend.
    pub async fn inject(&self, faults: Faults) {
        self.state.lock().await.faults = faults;
    }

    /// Stores a file directly, bypassing the [`Storage`] operations.
    pub async fn put_object(
        &self,
        bucket: media::Bucket,
        path: media::Path,
        created_at: media::CreationDateTime,
    ) {
        drop(self.state.lock().await.objects.insert(
            (bucket, path),
            Object {
                bytes: Bytes::new(),
                created_at,
            },
        ));
    }

    /// Returns [`media::Path`]s of all the files stored in the provided
    /// [`media::Bucket`].
    pub async fn object_paths(&self, bucket: media::Bucket) -> Vec<media::Path> {
        self.state
            .lock()
            .await
            .objects
            .keys()
            .filter(|(b, _)| *b == bucket)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Returns the content of the file stored at the provided [`media::Path`],
    /// if any.
    pub async fn object(
        &self,
        bucket: media::Bucket,
        path: &media::Path,
    ) -> Option<Bytes> {
        self.state
            .lock()
            .await
            .objects
            .get(&(bucket, path.clone()))
            .map(|o| o.bytes.clone())
    }

    /// Sets the [`payment::Status`] of the [`PaymentIntent`] with the
    /// provided ID, as if the customer completed some payment step.
    pub async fn set_intent_status(
        &self,
        id: &payment::IntentId,
        status: payment::Status,
    ) {
        if let Some(intent) = self.state.lock().await.intents.get_mut(id) {
            intent.status = status;
        }
    }

    /// Returns all the delivered [`Mail`]s in delivery order.
    pub async fn mails(&self) -> Vec<Mail> {
        self.state.lock().await.mails.clone()
    }
}

impl State {
    /// Fails if writing to the database is faulty.
    fn write(&self) -> Result<(), Traced<database::Error>> {
        if self.faults.database_writes {
            return Err(tracerr::map_from(tracerr::new!(Error(
                "database write"
            ))));
        }
        Ok(())
    }

    /// Returns the [`Project`] with the provided ID along with its images.
    fn project(&self, id: project::Id) -> Option<Project> {
        let mut project = self.projects.get(&id)?.clone();
        project.images = self
            .project_images
            .iter()
            .filter(|i| i.project_id == id)
            .cloned()
            .collect();
        Some(project)
    }
}

impl Database<Select<By<Vec<Product>, ()>>> for Memory {
    type Ok = Vec<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Product>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut products = self
            .state
            .lock()
            .await
            .products
            .values()
            .cloned()
            .collect::<Vec<_>>();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }
}

impl Database<Select<By<Option<Product>, product::Id>>> for Memory {
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Product>, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .state
            .lock()
            .await
            .products
            .get(&by.into_inner())
            .cloned())
    }
}

impl Database<Insert<Product>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(product): Insert<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        state.write().map_err(tracerr::wrap!())?;
        drop(state.products.insert(product.id, product));
        Ok(())
    }
}

impl Database<Update<Product>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(product): Update<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        state.write().map_err(tracerr::wrap!())?;
        if let Some(existing) = state.products.get_mut(&product.id) {
            *existing = product;
        }
        Ok(())
    }
}

impl Database<Delete<By<Product, product::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Product, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        state.write().map_err(tracerr::wrap!())?;
        drop(state.products.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<Vec<Project>, ()>>> for Memory {
    type Ok = Vec<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Project>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state.lock().await;
        let mut projects = state
            .projects
            .keys()
            .filter_map(|id| state.project(*id))
            .collect::<Vec<_>>();
        projects.sort_by(|a, b| {
            b.completed_date
                .cmp(&a.completed_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(projects)
    }
}

impl Database<Select<By<Option<Project>, project::Id>>> for Memory {
    type Ok = Option<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Project>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state.lock().await.project(by.into_inner()))
    }
}

impl Database<Insert<Project>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(mut project): Insert<Project>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        state.write().map_err(tracerr::wrap!())?;
        project.images.clear();
        drop(state.projects.insert(project.id, project));
        Ok(())
    }
}

impl Database<Insert<project::Image>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<project::Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        state.write().map_err(tracerr::wrap!())?;
        state.project_images.push(image);
        Ok(())
    }
}

impl Database<Delete<By<Project, project::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Project, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let mut state = self.state.lock().await;
        state.write().map_err(tracerr::wrap!())?;
        state.project_images.retain(|i| i.project_id != id);
        drop(state.projects.remove(&id));
        Ok(())
    }
}

impl Database<Select<By<read::media::ReferencedPaths, media::Bucket>>>
    for Memory
{
    type Ok = read::media::ReferencedPaths;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::media::ReferencedPaths, media::Bucket>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state.lock().await;
        Ok(read::media::ReferencedPaths(match by.into_inner() {
            media::Bucket::Products => state
                .products
                .values()
                .filter_map(|p| p.image.as_ref().map(|i| i.path.clone()))
                .collect(),
            media::Bucket::Projects => state
                .project_images
                .iter()
                .map(|i| i.media.path.clone())
                .collect(),
        }))
    }
}

impl Storage<Insert<media::Upload>> for Memory {
    type Ok = media::Image;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(upload): Insert<media::Upload>,
    ) -> Result<Self::Ok, Self::Err> {
        let media::Upload { bucket, path, file } = upload;

        let mut state = self.state.lock().await;
        if let Some(left) = &mut state.faults.uploads_left {
            if *left == 0 {
                return Err(tracerr::map_from(tracerr::new!(Error("upload"))));
            }
            *left -= 1;
        }

        let url = format!("memory://{bucket}/{path}").into();
        drop(state.objects.insert(
            (bucket, path.clone()),
            Object {
                bytes: file.bytes,
                created_at: media::CreationDateTime::now(),
            },
        ));
        Ok(media::Image { url, path })
    }
}

impl Storage<Delete<media::Removal>> for Memory {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(removal): Delete<media::Removal>,
    ) -> Result<Self::Ok, Self::Err> {
        let media::Removal { bucket, paths } = removal;

        let mut state = self.state.lock().await;
        if state.faults.removals {
            return Err(tracerr::map_from(tracerr::new!(Error("removal"))));
        }
        for path in paths {
            drop(state.objects.remove(&(bucket, path)));
        }
        Ok(())
    }
}

impl Storage<Select<By<Vec<media::Object>, media::Bucket>>> for Memory {
    type Ok = Vec<media::Object>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<media::Object>, media::Bucket>>,
    ) -> Result<Self::Ok, Self::Err> {
        let bucket = by.into_inner();
        Ok(self
            .state
            .lock()
            .await
            .objects
            .iter()
            .filter(|((b, _), _)| *b == bucket)
            .map(|((_, path), object)| media::Object {
                path: path.clone(),
                created_at: Some(object.created_at),
            })
            .collect())
    }
}

impl Payments<Insert<NewPaymentIntent>> for Memory {
    type Ok = PaymentIntent;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        Insert(intent): Insert<NewPaymentIntent>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;

        let raw_id = format!("pi_memory_{}", state.intents.len() + 1);
        let id = payment::IntentId::new(&raw_id)
            .ok_or_else(|| tracerr::new!(Error("payment intent creation")))
            .map_err(tracerr::map_from)?;
        let amount = intent
            .amount
            .minor_units()
            .ok_or_else(|| tracerr::new!(Error("payment intent creation")))
            .map_err(tracerr::map_from)?;
        let created = PaymentIntent {
            id: id.clone(),
            client_secret: Some(format!("{raw_id}_secret").into()),
            amount,
            currency: intent.amount.currency,
            status: payment::Status::RequiresPaymentMethod,
        };
        drop(state.intents.insert(id, created.clone()));
        Ok(created)
    }
}

impl Payments<Select<By<Option<PaymentIntent>, payment::IntentId>>>
    for Memory
{
    type Ok = Option<PaymentIntent>;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PaymentIntent>, payment::IntentId>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .state
            .lock()
            .await
            .intents
            .get(&by.into_inner())
            .cloned())
    }
}

impl Payments<Insert<NewCheckoutSession>> for Memory {
    type Ok = CheckoutSession;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        _: Insert<NewCheckoutSession>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        state.sessions += 1;

        let id = format!("cs_memory_{}", state.sessions);
        Ok(CheckoutSession {
            url: Some(format!("memory://checkout/{id}")),
            id,
        })
    }
}

impl Mailer<Deliver<Mail>> for Memory {
    type Ok = ();
    type Err = Traced<mailer::Error>;

    async fn execute(
        &self,
        Deliver(mail): Deliver<Mail>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        if let Some(left) = &mut state.faults.mails_left {
            if *left == 0 {
                return Err(tracerr::map_from(tracerr::new!(Error(
                    "mail delivery"
                ))));
            }
            *left -= 1;
        }
        state.mails.push(mail);
        Ok(())
    }
}

/// [`Memory`] error.
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("Injected `Memory` {_0} failure")]
pub struct Error(#[error(not(source))] &'static str);
