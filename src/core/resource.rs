//! Resources carrying hypermedia links

use crate::core::link::Link;
use serde::{Deserialize, Serialize};

/// Insertion-ordered collection of links
///
/// [`Links::add`] keeps duplicates of a relation, [`Links::replace`] keeps
/// at most one link per relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(Vec<Link>);

impl Links {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a link, keeping any existing link with the same relation
    pub fn add(&mut self, link: Link) {
        self.0.push(link);
    }

    /// Remove every link with the link's relation, then append it
    pub fn replace(&mut self, link: Link) {
        self.remove(link.rel());
        self.0.push(link);
    }

    /// Remove all links with the given relation, returning how many were removed
    pub fn remove(&mut self, rel: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|link| link.rel() != rel);
        before - self.0.len()
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.0.iter().any(|link| link.rel() == rel)
    }

    /// First link with the given relation
    pub fn get_link(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|link| link.rel() == rel)
    }

    /// All links with the given relation, in insertion order
    pub fn get_links(&self, rel: &str) -> Vec<&Link> {
        self.0.iter().filter(|link| link.rel() == rel).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Links {
    type Item = Link;
    type IntoIter = std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Link> for Links {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A value that carries a link collection
///
/// Implement it for representation models directly (see [`impl_linkable!`])
/// or wrap plain domain values in [`Resource`].
pub trait Linkable {
    fn links(&self) -> &Links;

    fn links_mut(&mut self) -> &mut Links;

    /// Append a link, keeping duplicates of its relation
    fn add_link(&mut self, link: Link) -> &mut Self
    where
        Self: Sized,
    {
        self.links_mut().add(link);
        self
    }

    fn has_link(&self, rel: &str) -> bool {
        self.links().has_link(rel)
    }

    fn get_link(&self, rel: &str) -> Option<&Link> {
        self.links().get_link(rel)
    }
}

/// A domain value wrapped together with its links
///
/// Serializes as the content's own fields plus a `links` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<T> {
    #[serde(flatten)]
    pub content: T,

    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl<T> Resource<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: Links::new(),
        }
    }

    pub fn into_content(self) -> T {
        self.content
    }
}

impl<T> Linkable for Resource<T> {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// Implement [`Linkable`] for a struct holding a [`Links`] field
///
/// ```rust,ignore
/// struct CustomerModel {
///     id: String,
///     links: Links,
/// }
///
/// impl_linkable!(CustomerModel);            // field named `links`
/// impl_linkable!(OrderModel, hypermedia);   // custom field name
/// ```
#[macro_export]
macro_rules! impl_linkable {
    ($type:ty) => {
        $crate::impl_linkable!($type, links);
    };
    ($type:ty, $field:ident) => {
        impl $crate::core::resource::Linkable for $type {
            fn links(&self) -> &$crate::core::resource::Links {
                &self.$field
            }

            fn links_mut(&mut self) -> &mut $crate::core::resource::Links {
                &mut self.$field
            }
        }
    };
}
