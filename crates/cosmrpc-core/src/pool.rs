//! Ordered endpoint pool with a mutex-guarded "current" cursor.
//!
//! Endpoints are fixed at construction and only ever rotated through. The
//! lock covers the read-modify-write of the index and nothing else, so
//! in-flight requests never hold it.

use std::sync::{Mutex, PoisonError};

use crate::error::{ClientError, TransportError};

/// Round-robin pool of endpoint handles.
#[derive(Debug)]
pub struct EndpointPool<E> {
    endpoints: Vec<E>,
    current: Mutex<usize>,
}

impl<E: Clone> EndpointPool<E> {
    /// Build a pool from already-dialed endpoints.
    pub fn new(endpoints: Vec<E>) -> Result<Self, ClientError> {
        if endpoints.is_empty() {
            return Err(ClientError::Config("no endpoint".into()));
        }
        Ok(Self {
            endpoints,
            current: Mutex::new(0),
        })
    }

    /// Dial every address with `dial` and build a pool from the results.
    ///
    /// Fails on an empty list or on the first address that cannot be dialed.
    pub fn dial<A, F>(addrs: &[A], mut dial: F) -> Result<Self, ClientError>
    where
        A: AsRef<str>,
        F: FnMut(&str) -> Result<E, TransportError>,
    {
        if addrs.is_empty() {
            return Err(ClientError::Config("no endpoint".into()));
        }
        let endpoints = addrs
            .iter()
            .map(|addr| {
                let addr = addr.as_ref();
                dial(addr).map_err(|source| ClientError::Dial {
                    endpoint: addr.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(endpoints)
    }

    /// Number of endpoints in the pool.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always `false`; construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Index of the endpoint currently in use.
    pub fn current_index(&self) -> usize {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The endpoint currently selected for use.
    pub fn current(&self) -> E {
        self.endpoints[self.current_index()].clone()
    }

    /// Advance to the next endpoint (wrapping) and return it.
    pub fn rotate(&self) -> E {
        let next = {
            let mut idx = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            *idx = (*idx + 1) % self.endpoints.len();
            *idx
        };
        self.endpoints[next].clone()
    }

    /// All endpoints in pool order.
    pub fn endpoints(&self) -> &[E] {
        &self.endpoints
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn pool(n: usize) -> EndpointPool<usize> {
        EndpointPool::new((0..n).collect()).unwrap()
    }

    #[test]
    fn empty_pool_rejected() {
        let err = EndpointPool::<usize>::new(vec![]).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn rotate_n_times_is_cyclic() {
        for n in 1..=5 {
            let p = pool(n);
            let start = p.current();
            for _ in 0..n {
                p.rotate();
            }
            assert_eq!(p.current(), start);
        }
    }

    #[test]
    fn rotate_returns_new_current() {
        let p = pool(3);
        assert_eq!(p.current(), 0);
        assert_eq!(p.rotate(), 1);
        assert_eq!(p.current_index(), 1);
        assert_eq!(p.rotate(), 2);
        assert_eq!(p.rotate(), 0);
    }

    #[test]
    fn dial_failure_names_endpoint() {
        let err = EndpointPool::<String>::dial(&["http://a", "bad"], |addr| {
            if addr.starts_with("http") {
                Ok(addr.to_string())
            } else {
                Err(TransportError::Other("unsupported scheme".into()))
            }
        })
        .unwrap_err();
        match err {
            ClientError::Dial { endpoint, .. } => assert_eq!(endpoint, "bad"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dial_empty_list() {
        let err = EndpointPool::<String>::dial::<&str, _>(&[], |a| Ok(a.to_string())).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn concurrent_rotation_keeps_index_valid() {
        let p = Arc::new(pool(4));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = p.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        p.rotate();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // 800 rotations over 4 endpoints lands back on 0
        assert_eq!(p.current_index(), 0);
    }
}
