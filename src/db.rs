use diesel::connection::SimpleConnection;
use diesel::r2d2::ConnectionManager;
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};
use r2d2::CustomizeConnection;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Build, Request, Rocket};

use crate::error::{ApiError, ErrorResponse};
use crate::settings::Settings;

pub type Pool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn establish_connection(database_url: &str) -> Result<Pool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
}

/// Builds the pool, runs pending migrations and puts the pool into managed state.
pub(crate) async fn init_database(rocket: Rocket<Build>) -> Result<Rocket<Build>, Rocket<Build>> {
    let database_url = match rocket.state::<Settings>() {
        Some(settings) => settings.database_url.clone(),
        None => {
            error!("Settings must be managed before the database is initialised");
            return Err(rocket);
        }
    };

    let pool = match establish_connection(&database_url) {
        Ok(pool) => pool,
        Err(err) => {
            error!("Couldn't create database pool for {}: {}", database_url, err);
            return Err(rocket);
        }
    };

    let migrated = pool
        .get()
        .map_err(|err| err.to_string())
        .and_then(|mut conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|applied| applied.len())
                .map_err(|err| err.to_string())
        });

    match migrated {
        Ok(count) => {
            info!("Database ready, {} migrations applied", count);
            Ok(rocket.manage(pool))
        }
        Err(err) => {
            error!("Couldn't run migrations: {}", err);
            Err(rocket)
        }
    }
}

/// Request guard handing out pooled connections on the blocking thread pool.
pub(crate) struct DbConn(Pool);

impl DbConn {
    pub(crate) async fn run<F, T>(&self, f: F) -> Result<T, ErrorResponse>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, ErrorResponse> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.0.clone();

        rocket::tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|err| {
                error!("Couldn't get database connection: {}", err);
                ErrorResponse::internal("Couldn't connect to database")
            })?;
            f(&mut *conn)
        })
        .await
        .map_err(|err| {
            error!("Database task panicked: {}", err);
            ErrorResponse::internal("Database task failed")
        })?
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for DbConn {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.rocket().state::<Pool>() {
            Some(pool) => Outcome::Success(DbConn(pool.clone())),
            None => Outcome::Error((
                Status::InternalServerError,
                ApiError::new("Couldn't get database pool"),
            )),
        }
    }
}
