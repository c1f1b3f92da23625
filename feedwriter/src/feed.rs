//! The feed orchestrator.
//!
//! [`Feed::new`] validates the map against every view, then drives the source
//! to exhaustion, mapping each record once and handing the canonical record to
//! every view in declaration order. A constructed feed is complete: views can
//! be looked up and rendered, but nothing can be rebound.

use std::fmt;

use crate::error::{ConfigError, FeedError, FeedResult};
use crate::mapping::FieldMap;
use crate::record::IntoRecord;
use crate::view::View;

/// Named views in declaration order.
#[derive(Default)]
pub struct ViewSet {
    views: Vec<(String, Box<dyn View>)>,
}

impl ViewSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register `view` under `name`.
    pub fn with<V: View + 'static>(mut self, name: impl Into<String>, view: V) -> Self {
        self.push(name, Box::new(view));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, view: Box<dyn View>) {
        self.views.push((name.into(), view));
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Look up a view by name.
    pub fn get(&self, name: &str) -> Option<&dyn View> {
        self.views
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_ref())
    }

    /// Render the named view.
    pub fn render(&self, name: &str) -> FeedResult<String> {
        let view = self
            .get(name)
            .ok_or_else(|| FeedError::UnknownView(name.to_string()))?;
        Ok(view.render()?)
    }

    /// View names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.iter().map(|(n, _)| n.as_str())
    }
}

impl fmt::Debug for ViewSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<N: Into<String>> FromIterator<(N, Box<dyn View>)> for ViewSet {
    fn from_iter<I: IntoIterator<Item = (N, Box<dyn View>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, view) in iter {
            set.push(name, view);
        }
        set
    }
}

/// A completed run of one source through one map into a set of views.
pub struct Feed {
    map: FieldMap,
    views: ViewSet,
    record_count: usize,
}

impl Feed {
    /// Validate, then map and fan out every record of `source`.
    ///
    /// Configuration problems are reported before the source is touched. A
    /// mapping or view failure stops the pass at the offending record and
    /// comes back as [`FeedError::Interrupted`], which hands the views back
    /// with whatever they collected before it.
    pub fn new<S>(source: S, map: FieldMap, views: ViewSet) -> FeedResult<Self>
    where
        S: IntoIterator,
        S::Item: IntoRecord,
    {
        validate(&map, &views)?;

        let mut views = views;
        let mut record_count = 0;
        if let Err(cause) = spin(source, &map, &mut views, &mut record_count) {
            return Err(FeedError::Interrupted {
                cause: Box::new(cause),
                views,
                record_count,
            });
        }

        Ok(Self {
            map,
            views,
            record_count,
        })
    }

    /// Look up a view by the name it was declared with.
    pub fn view(&self, name: &str) -> Option<&dyn View> {
        self.views.get(name)
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.view(name).is_some()
    }

    /// Like [`Feed::view`], but an unknown name is an error.
    pub fn require_view(&self, name: &str) -> FeedResult<&dyn View> {
        self.view(name)
            .ok_or_else(|| FeedError::UnknownView(name.to_string()))
    }

    /// Render the named view.
    pub fn render(&self, name: &str) -> FeedResult<String> {
        self.views.render(name)
    }

    /// View names in declaration order.
    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views.names()
    }

    /// Source records mapped and delivered to every view.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn map(&self) -> &FieldMap {
        &self.map
    }
}

/// Map each record once and hand it to every view in order. `record_count`
/// counts records delivered to all views.
fn spin<S>(
    source: S,
    map: &FieldMap,
    views: &mut ViewSet,
    record_count: &mut usize,
) -> FeedResult<()>
where
    S: IntoIterator,
    S::Item: IntoRecord,
{
    for (index, item) in source.into_iter().enumerate() {
        let record = item.into_record(index)?;
        let output = map.apply(&record, index)?;
        for (_, view) in views.views.iter_mut() {
            view.collect(&output)?;
        }
        *record_count += 1;
    }
    Ok(())
}

fn validate(map: &FieldMap, views: &ViewSet) -> Result<(), ConfigError> {
    if views.is_empty() {
        return Err(ConfigError::NoViews);
    }
    if map.is_empty() {
        return Err(ConfigError::EmptyMap);
    }

    for (i, (name, view)) in views.views.iter().enumerate() {
        if views.views[..i].iter().any(|(other, _)| other == name) {
            return Err(ConfigError::DuplicateView(name.clone()));
        }
        if let Some(field) = view.required_fields().iter().find(|f| !map.contains(f)) {
            return Err(ConfigError::MissingMapping {
                view: name.clone(),
                field: field.clone(),
            });
        }
    }

    Ok(())
}
