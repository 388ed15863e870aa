//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Tables with an
//! `is_active` column soft-delete by clearing it; `files` uses a nullable
//! `deleted_at` instead.

diesel::table! {
    users (id) {
        id -> Uuid,
        name -> Text,
        email -> Nullable<Text>,
        phone -> Nullable<Text>,
        auth_provider -> Text,
        preferences -> Array<Text>,
        dietary_restrictions -> Array<Text>,
        default_address_id -> Nullable<Uuid>,
        meta -> Nullable<Jsonb>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    user_addresses (id) {
        id -> Uuid,
        user_id -> Uuid,
        address_line1 -> Text,
        address_line2 -> Nullable<Text>,
        city -> Text,
        state -> Text,
        postal_code -> Text,
        country -> Text,
        alias_name -> Nullable<Text>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        is_primary -> Bool,
        meta -> Nullable<Jsonb>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    restaurants (id) {
        id -> Uuid,
        name -> Text,
        email -> Nullable<Text>,
        phone -> Nullable<Text>,
        auth_provider -> Text,
        owner_id -> Nullable<Uuid>,
        cuisine_types -> Array<Text>,
        operating_hours -> Jsonb,
        location -> Text,
        rating -> Float8,
        delivery_fee -> Float8,
        image_file_ids -> Array<Uuid>,
        meta -> Nullable<Jsonb>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    menu_categories (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        meta -> Nullable<Jsonb>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    menu_items (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        category_id -> Nullable<Uuid>,
        name -> Text,
        description -> Nullable<Text>,
        price -> Float8,
        is_available -> Bool,
        /// Opaque vector from the embedding collaborator.
        embedding -> Nullable<Array<Float4>>,
        image_file_ids -> Array<Uuid>,
        meta -> Nullable<Jsonb>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    files (id) {
        id -> Uuid,
        uploader_id -> Uuid,
        storage_path -> Text,
        filename -> Text,
        mime_type -> Text,
        size_bytes -> Int8,
        /// Lower-case hex SHA-256 of the content.
        checksum -> Text,
        purpose -> Text,
        is_public -> Bool,
        /// `{width, height}` or `{}`.
        dimensions -> Jsonb,
        meta -> Nullable<Jsonb>,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
