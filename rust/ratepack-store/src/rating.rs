/// One user's rating of one item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rating {
    pub user: i64,
    pub item: i64,
    pub value: f64,
    /// Present exactly when the file was packed with timestamps.
    pub timestamp: Option<i64>,
}

impl Rating {
    pub fn new(user: i64, item: i64, value: f64) -> Rating {
        Rating {
            user,
            item,
            value,
            timestamp: None,
        }
    }

    pub fn with_timestamp(self, timestamp: i64) -> Rating {
        Rating {
            timestamp: Some(timestamp),
            ..self
        }
    }
}
