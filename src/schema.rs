diesel::table! {
    attachments (id) {
        id -> Integer,
        storage_key -> Text,
        filename -> Text,
        content_type -> Text,
        byte_size -> BigInt,
        created_at -> Timestamp,
    }
}

diesel::table! {
    bars (id) {
        id -> Integer,
        name -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    bars_beers (id) {
        id -> Integer,
        bar_id -> Integer,
        beer_id -> Integer,
    }
}

diesel::table! {
    beers (id) {
        id -> Integer,
        name -> Text,
        brand_id -> Integer,
        style -> Nullable<Text>,
        hop -> Nullable<Text>,
        yeast -> Nullable<Text>,
        malts -> Nullable<Text>,
        ibu -> Nullable<Integer>,
        alcohol -> Nullable<Double>,
        blg -> Nullable<Double>,
        image_id -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    brands (id) {
        id -> Integer,
        name -> Text,
        brewery_id -> Integer,
    }
}

diesel::table! {
    breweries (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    event_attendances (id) {
        id -> Integer,
        event_id -> Integer,
        user_id -> Integer,
        checked_in_at -> Timestamp,
    }
}

diesel::table! {
    event_pictures (id) {
        id -> Integer,
        event_id -> Integer,
        user_id -> Integer,
        description -> Nullable<Text>,
        image_id -> Integer,
        created_at -> Timestamp,
    }
}

diesel::table! {
    events (id) {
        id -> Integer,
        name -> Text,
        description -> Nullable<Text>,
        date -> Date,
        bar_id -> Integer,
        flyer_image_id -> Nullable<Integer>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    reviews (id) {
        id -> Integer,
        beer_id -> Integer,
        user_id -> Integer,
        text -> Text,
        rating -> Integer,
        created_at -> Timestamp,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        first_name -> Text,
        last_name -> Text,
        handle -> Text,
        email -> Text,
        password_hash -> Text,
        created_at -> Timestamp,
    }
}

diesel::joinable!(bars_beers -> bars (bar_id));
diesel::joinable!(bars_beers -> beers (beer_id));
diesel::joinable!(beers -> brands (brand_id));
diesel::joinable!(brands -> breweries (brewery_id));
diesel::joinable!(event_attendances -> events (event_id));
diesel::joinable!(event_attendances -> users (user_id));
diesel::joinable!(event_pictures -> events (event_id));
diesel::joinable!(event_pictures -> users (user_id));
diesel::joinable!(events -> bars (bar_id));
diesel::joinable!(reviews -> beers (beer_id));
diesel::joinable!(reviews -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    attachments,
    bars,
    bars_beers,
    beers,
    brands,
    breweries,
    event_attendances,
    event_pictures,
    events,
    reviews,
    users,
);
