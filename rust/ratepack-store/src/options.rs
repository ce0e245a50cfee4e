/// Settings for opening a rating file.
#[derive(Clone, Debug)]
pub struct OpenOptions {
    /// Pre-fault the whole mapping at open time instead of paging rows in on demand.
    pub populate: bool,
    /// Check that each index table lists every row exactly once. Row positions are always
    /// bounds-checked; this additionally rejects files whose tables repeat or skip rows.
    pub verify_row_indices: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            populate: false,
            verify_row_indices: true,
        }
    }
}

impl OpenOptions {
    pub fn populate(mut self, populate: bool) -> OpenOptions {
        self.populate = populate;
        self
    }

    pub fn verify_row_indices(mut self, verify: bool) -> OpenOptions {
        self.verify_row_indices = verify;
        self
    }
}

/// Settings for writing a rating file.
#[derive(Clone, Debug)]
pub struct PackOptions {
    /// Store a timestamp with every rating.
    pub timestamps: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions { timestamps: true }
    }
}

impl PackOptions {
    pub fn timestamps(mut self, timestamps: bool) -> PackOptions {
        self.timestamps = timestamps;
        self
    }
}
