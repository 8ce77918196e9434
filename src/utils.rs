use simple_error::{SimpleResult, try_with};

/// Build the rayon worker pool used for all per-component and per-split tasks
pub fn build_worker_pool(thread_count: usize) -> SimpleResult<rayon::ThreadPool> {
    let worker_pool = try_with!(
        rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build(),
        "Unable to create worker pool with {} threads",
        thread_count
    );
    Ok(worker_pool)
}
