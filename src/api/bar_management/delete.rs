use diesel::prelude::*;
use log::info;
use rocket::http::Status;

use super::get_bar::find_bar;
use crate::api::user_management::models::UserLoggedIn;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;
use crate::validation::Validator;

/// Bars that still host events can't be deleted; that surfaces as a 422 on `base`.
#[delete("/bars/<bid>")]
pub(crate) async fn delete_bar(
    bid: i32,
    user: UserLoggedIn,
    conn: DbConn,
) -> Result<Status, ErrorResponse> {
    conn.run(move |c| {
        c.transaction::<_, ErrorResponse, _>(|c| {
            let bar = find_bar(c, bid)?;

            let event_count = {
                use schema::events::dsl::*;
                events.filter(bar_id.eq(bar.id)).count().get_result::<i64>(c)?
            };
            if event_count > 0 {
                let mut validator = Validator::new();
                validator.add(
                    "base",
                    "Cannot delete record because dependent events exist",
                );
                validator.finish()?;
            }

            {
                use schema::bars::dsl::*;
                diesel::delete(bars.find(bar.id)).execute(c)?;
            }

            Ok(())
        })
    })
    .await?;

    info!("User {} deleted bar {}", user.0.id, bid);

    Ok(Status::NoContent)
}
