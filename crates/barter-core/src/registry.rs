use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use barter_types::models::{Ad, AdId, AdInput, UserId};

use crate::error::{ExchangeError, ExchangeResult, Field};
use crate::store::AdStore;

/// Ads shown per listing page.
pub const ADS_PER_PAGE: u32 = 15;

const FIELD_LIMITS: [(Field, usize); 4] = [
    (Field::Title, 200),
    (Field::Description, 500),
    (Field::Category, 200),
    (Field::Condition, 200),
];

const MAX_IMAGE_URL_LEN: usize = 200;

/// Ad CRUD with ownership checks.
pub struct AdService<S> {
    store: Arc<S>,
}

impl<S> Clone for AdService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: AdStore> AdService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(&self, owner: UserId, input: AdInput) -> ExchangeResult<Ad> {
        let input = validate(input)?;
        let ad = self.store.insert_ad(owner, &input)?;
        info!("Ad #{} created by {}", ad.id, owner);
        Ok(ad)
    }

    pub fn get(&self, id: AdId) -> ExchangeResult<Ad> {
        self.store
            .get_ad(id)?
            .ok_or(ExchangeError::UnknownAd(id))
    }

    pub fn update(&self, id: AdId, user: UserId, input: AdInput) -> ExchangeResult<Ad> {
        let ad = self.owned(id, user)?;
        let input = validate(input)?;
        self.store.update_ad(id, &input)?;

        Ok(Ad {
            title: input.title,
            description: input.description,
            category: input.category,
            condition: input.condition,
            image_url: input.image_url,
            ..ad
        })
    }

    /// Deleting an ad also drops every proposal that references it.
    pub fn delete(&self, id: AdId, user: UserId) -> ExchangeResult<()> {
        self.owned(id, user)?;
        self.store.delete_ad(id)?;
        info!("Ad #{} deleted by {}", id, user);
        Ok(())
    }

    /// One page of all ads, newest first. Pages start at 1. The second value
    /// tells whether another page follows.
    pub fn list(&self, page: u32) -> ExchangeResult<(Vec<Ad>, bool)> {
        let offset = page.max(1).saturating_sub(1).saturating_mul(ADS_PER_PAGE);
        let mut ads = self.store.list_ads(ADS_PER_PAGE + 1, offset)?;
        let has_next = ads.len() > ADS_PER_PAGE as usize;
        ads.truncate(ADS_PER_PAGE as usize);
        Ok((ads, has_next))
    }

    pub fn list_owned(&self, owner: UserId) -> ExchangeResult<Vec<Ad>> {
        Ok(self.store.list_ads_by_owner(owner)?)
    }

    fn owned(&self, id: AdId, user: UserId) -> ExchangeResult<Ad> {
        let ad = self.get(id)?;
        if ad.owner != user {
            warn!("User {} may not modify ad #{}", user, id);
            return Err(ExchangeError::Forbidden);
        }
        Ok(ad)
    }
}

/// Checks the text fields and normalizes a blank image URL to none.
fn validate(mut input: AdInput) -> ExchangeResult<AdInput> {
    let values = [
        &input.title,
        &input.description,
        &input.category,
        &input.condition,
    ];
    for ((field, max), value) in FIELD_LIMITS.iter().zip(values) {
        if value.trim().is_empty() {
            return Err(ExchangeError::InvalidAd { field: *field, reason: "required" });
        }
        if value.chars().count() > *max {
            return Err(ExchangeError::InvalidAd { field: *field, reason: "too long" });
        }
    }

    input.image_url = match input.image_url.take() {
        Some(raw) if !raw.trim().is_empty() => Some(check_image_url(raw.trim())?.to_string()),
        _ => None,
    };
    Ok(input)
}

fn check_image_url(raw: &str) -> ExchangeResult<&str> {
    let invalid = |reason| ExchangeError::InvalidAd { field: Field::ImageUrl, reason };
    if raw.chars().count() > MAX_IMAGE_URL_LEN {
        return Err(invalid("too long"));
    }
    let url = Url::parse(raw).map_err(|_| invalid("not a valid URL"))?;
    let known_scheme = matches!(url.scheme(), "http" | "https" | "ftp" | "ftps");
    if !known_scheme || !url.has_host() {
        return Err(invalid("not a valid URL"));
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use uuid::Uuid;

    fn input() -> AdInput {
        AdInput {
            title: "Guitar".into(),
            description: "Six strings".into(),
            category: "music".into(),
            condition: "worn".into(),
            image_url: None,
        }
    }

    fn service() -> AdService<MemoryStore> {
        AdService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn blank_fields_are_reported_by_name() {
        let ads = service();
        let mut bad = input();
        bad.category = "  ".into();

        let err = ads.create(Uuid::new_v4(), bad).unwrap_err();
        assert_eq!(err.field(), Some(Field::Category));
    }

    #[test]
    fn title_length_is_bounded() {
        let ads = service();
        let mut bad = input();
        bad.title = "t".repeat(201);
        assert!(matches!(
            ads.create(Uuid::new_v4(), bad),
            Err(ExchangeError::InvalidAd { field: Field::Title, .. })
        ));
    }

    #[test]
    fn only_owner_modifies() {
        let ads = service();
        let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());
        let ad = ads.create(owner, input()).unwrap();

        let mut changed = input();
        changed.title = "Bass guitar".into();
        assert!(matches!(
            ads.update(ad.id, other, changed.clone()),
            Err(ExchangeError::Forbidden)
        ));
        assert!(matches!(ads.delete(ad.id, other), Err(ExchangeError::Forbidden)));

        let updated = ads.update(ad.id, owner, changed).unwrap();
        assert_eq!(updated.title, "Bass guitar");
        assert_eq!(updated.created_at, ad.created_at);
        assert_eq!(ads.get(ad.id).unwrap().title, "Bass guitar");

        ads.delete(ad.id, owner).unwrap();
        assert!(matches!(ads.get(ad.id), Err(ExchangeError::UnknownAd(id)) if id == ad.id));
    }

    #[test]
    fn pages_hold_fifteen_ads() {
        let ads = service();
        let owner = Uuid::new_v4();
        for _ in 0..20 {
            ads.create(owner, input()).unwrap();
        }

        let (first, more) = ads.list(1).unwrap();
        assert_eq!(first.len(), 15);
        assert!(more);

        let (second, more) = ads.list(2).unwrap();
        assert_eq!(second.len(), 5);
        assert!(!more);

        // page 0 is treated as the first page
        assert_eq!(ads.list(0).unwrap().0.len(), 15);
    }

    #[test]
    fn image_url_is_optional_but_must_parse() {
        let ads = service();
        let owner = Uuid::new_v4();

        let mut with_image = input();
        with_image.image_url = Some("https://www.python.org/static/img/python-logo.png".into());
        let ad = ads.create(owner, with_image).unwrap();
        assert_eq!(
            ad.image_url.as_deref(),
            Some("https://www.python.org/static/img/python-logo.png")
        );

        let mut blank = input();
        blank.image_url = Some("  ".into());
        assert_eq!(ads.create(owner, blank).unwrap().image_url, None);

        for bad in ["not url", "javascript:alert(1)", "mailto:a@b.c"] {
            let mut rejected = input();
            rejected.image_url = Some(bad.into());
            let err = ads.create(owner, rejected).unwrap_err();
            assert_eq!(err.field(), Some(Field::ImageUrl), "{bad}");
        }
    }
}
