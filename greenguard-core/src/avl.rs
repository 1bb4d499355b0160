//! AVL Tree
//!
//! ## Overview
//!
//! A height-balanced binary search tree. After each insertion the heights on the
//! path back to the root are recomputed and any node whose balance factor left
//! the range `-1..=1` is repaired with one or two rotations, which keeps the
//! height at O(log n).
//!
//! ## Rebalancing
//!
//! `balance = height(left) - height(right)`, with `height(None) = 0`.
//!
//! | Case | Condition                                  | Repair                         |
//! |------|--------------------------------------------|--------------------------------|
//! | LL   | `balance > 1`, left child balance `>= 0`   | rotate right                   |
//! | RR   | `balance < -1`, right child balance `<= 0` | rotate left                    |
//! | LR   | `balance > 1`, left child balance `< 0`    | rotate left child left, then right |
//! | RL   | `balance < -1`, right child balance `> 0`  | rotate right child right, then left |
//!
//! ```text
//!   LL: rotate right at z
//!
//!         z                y
//!        / \             /   \
//!       y   T4          x     z
//!      / \       ==>   / \   / \
//!     x   T3          T1 T2 T3 T4
//!    / \
//!   T1 T2
//! ```
//!
//! ## Ownership
//!
//! Each node owns its children through `Box`. There are no parent pointers.
//! `Drop` walks the tree with an explicit stack so a degenerate shape could never
//! overflow the call stack.
//!
//! Keys compare with `Ord`; inserting a key equal to an existing one is a no-op.

use core::cmp::Ordering;

type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug)]
struct Node<T> {
    key: T,
    left: Link<T>,
    right: Link<T>,
    height: u32,
}

impl<T> Node<T> {
    fn leaf(key: T) -> Box<Self> {
        Box::new(Self {
            key,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance(&self) -> i64 {
        i64::from(height(&self.left)) - i64::from(height(&self.right))
    }
}

#[inline]
fn height<T>(link: &Link<T>) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn rotate_right<T>(mut z: Box<Node<T>>) -> Box<Node<T>> {
    match z.left.take() {
        Some(mut y) => {
            z.left = y.right.take();
            z.update_height();
            y.right = Some(z);
            y.update_height();
            y
        }
        None => z,
    }
}

fn rotate_left<T>(mut z: Box<Node<T>>) -> Box<Node<T>> {
    match z.right.take() {
        Some(mut y) => {
            z.right = y.left.take();
            z.update_height();
            y.left = Some(z);
            y.update_height();
            y
        }
        None => z,
    }
}

fn rebalance<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    node.update_height();
    let balance = node.balance();

    if balance > 1 {
        if node.left.as_ref().map_or(0, |l| l.balance()) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if balance < -1 {
        if node.right.as_ref().map_or(0, |r| r.balance()) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn insert_at<T: Ord>(link: Link<T>, key: T, inserted: &mut bool) -> Box<Node<T>> {
    let mut node = match link {
        None => {
            *inserted = true;
            return Node::leaf(key);
        }
        Some(node) => node,
    };

    match key.cmp(&node.key) {
        Ordering::Less => node.left = Some(insert_at(node.left.take(), key, inserted)),
        Ordering::Greater => node.right = Some(insert_at(node.right.take(), key, inserted)),
        Ordering::Equal => return node,
    }
    rebalance(node)
}

/// Self-balancing binary search tree
#[derive(Debug)]
pub struct AvlTree<T> {
    root: Link<T>,
    len: usize,
}

impl<T: Ord> AvlTree<T> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Insert a key; returns `false` if an equal key was already present
    pub fn insert(&mut self, key: T) -> bool {
        let mut inserted = false;
        self.root = Some(insert_at(self.root.take(), key, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Whether an equal key is stored
    pub fn contains(&self, key: &T) -> bool {
        self.get(key).is_some()
    }

    /// The stored key equal to `key`
    pub fn get(&self, key: &T) -> Option<&T> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.key),
            };
        }
        None
    }

    /// Keys in `[min, max]`, ascending
    pub fn range(&self, min: &T, max: &T) -> Vec<&T> {
        let mut out = Vec::new();
        if min <= max {
            collect_range(self.root.as_deref(), &|k: &T| k >= min, &|k: &T| k <= max, &mut out);
        }
        out
    }

    /// Keys whose projection `key(k)` lies in `[min, max]`, ascending
    ///
    /// `key` must be monotone with the tree order (a prefix of the ordering
    /// key, such as the timestamp of a reading).
    pub fn range_by_key<K, F>(&self, min: &K, max: &K, key: F) -> Vec<&T>
    where
        K: Ord,
        F: Fn(&T) -> K,
    {
        let mut out = Vec::new();
        if min <= max {
            collect_range(
                self.root.as_deref(),
                &|k: &T| key(k) >= *min,
                &|k: &T| key(k) <= *max,
                &mut out,
            );
        }
        out
    }
}

impl<T> AvlTree<T> {
    /// Number of keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree, 0 when empty
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Smallest key
    pub fn min(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// Largest key
    pub fn max(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }

    /// In-order iterator
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// All keys in order
    pub fn inorder(&self) -> Vec<&T> {
        self.iter().collect()
    }

    /// Verify the AVL invariant and stored heights at every node
    pub fn is_balanced(&self) -> bool {
        fn check<T>(link: &Link<T>) -> Option<u32> {
            match link {
                None => Some(0),
                Some(node) => {
                    let l = check(&node.left)?;
                    let r = check(&node.right)?;
                    let h = 1 + l.max(r);
                    (l.abs_diff(r) <= 1 && node.height == h).then_some(h)
                }
            }
        }
        check(&self.root).is_some()
    }

    /// Remove every key
    pub fn clear(&mut self) {
        drop_iteratively(self.root.take());
        self.len = 0;
    }
}

fn collect_range<'a, T>(
    link: Option<&'a Node<T>>,
    above_min: &dyn Fn(&T) -> bool,
    below_max: &dyn Fn(&T) -> bool,
    out: &mut Vec<&'a T>,
) {
    let Some(node) = link else { return };
    let lo = above_min(&node.key);
    let hi = below_max(&node.key);
    if lo {
        collect_range(node.left.as_deref(), above_min, below_max, out);
    }
    if lo && hi {
        out.push(&node.key);
    }
    if hi {
        collect_range(node.right.as_deref(), above_min, below_max, out);
    }
}

fn drop_iteratively<T>(root: Link<T>) {
    let mut stack: Vec<Box<Node<T>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

impl<T> Drop for AvlTree<T> {
    fn drop(&mut self) {
        drop_iteratively(self.root.take());
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

/// In-order iterator over an [`AvlTree`]
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut link: Option<&'a Node<T>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.key)
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
