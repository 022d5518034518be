diesel::table! {
    restaurants (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    availability_slots (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        date -> Date,
        time_slot -> Text,
        capacity -> Int4,
        reserved -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    bookings (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        user_id -> Uuid,
        date -> Date,
        time -> Text,
        duration_minutes -> Int4,
        guests_count -> Int4,
        status -> Text,
        comment -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        confirmed_at -> Nullable<Timestamptz>,
        rejected_at -> Nullable<Timestamptz>,
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    booking_alternatives (id) {
        id -> Uuid,
        booking_id -> Uuid,
        date -> Date,
        time -> Text,
        message -> Text,
        created_at -> Timestamptz,
        accepted_at -> Nullable<Timestamptz>,
        rejected_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(availability_slots -> restaurants (restaurant_id));
diesel::joinable!(bookings -> restaurants (restaurant_id));
diesel::joinable!(bookings -> users (user_id));
diesel::joinable!(booking_alternatives -> bookings (booking_id));

diesel::allow_tables_to_appear_in_same_query!(
    restaurants,
    users,
    availability_slots,
    bookings,
    booking_alternatives,
);
