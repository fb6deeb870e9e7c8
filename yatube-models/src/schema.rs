diesel::table! {
    comments (id) {
        id -> Integer,
        text -> Text,
        created -> Timestamp,
        author_id -> Integer,
        post_id -> Integer,
    }
}

diesel::table! {
    follows (id) {
        id -> Integer,
        follower_id -> Integer,
        following_id -> Integer,
    }
}

diesel::table! {
    groups (id) {
        id -> Integer,
        title -> Text,
        slug -> Text,
        description -> Text,
    }
}

diesel::table! {
    posts (id) {
        id -> Integer,
        text -> Text,
        pub_date -> Timestamp,
        author_id -> Integer,
        group_id -> Nullable<Integer>,
        image -> Nullable<Text>,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        first_name -> Text,
        last_name -> Text,
        email -> Text,
        hashed_password -> Nullable<Text>,
        creation_date -> Timestamp,
    }
}

diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (author_id));
diesel::joinable!(posts -> groups (group_id));
diesel::joinable!(posts -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(comments, follows, groups, posts, users,);
