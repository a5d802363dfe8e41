use crate::db::raw::dataset::Dataset;

pub struct ProdDb {}

impl ProdDb {
    pub fn raw_hosts() -> Dataset {
        Dataset::new("hosts", "https://dbtlearn.s3.amazonaws.com/hosts.csv")
    }

    pub fn raw_reviews() -> Dataset {
        Dataset::new("reviews", "https://dbtlearn.s3.amazonaws.com/reviews.csv")
    }

    pub fn raw_listings() -> Dataset {
        Dataset::new("listings", "https://dbtlearn.s3.amazonaws.com/listings.csv")
    }

    /// All the raw datasets, in load order.
    pub fn raw_datasets() -> Vec<Dataset> {
        vec![
            ProdDb::raw_hosts(),
            ProdDb::raw_reviews(),
            ProdDb::raw_listings(),
        ]
    }
}
