pub mod application {
    pub mod use_cases {
        pub mod collect_workflow_runs;
        pub mod delete_workflow_runs;
        pub mod select_workflow_runs;
    }
}

pub mod domain {
    pub mod external_apis {
        pub mod github;
    }
    pub mod models {
        pub mod repository;
        pub mod run;
    }
}

pub mod infrastructures {
    pub mod adapters {
        pub mod primary {
            pub mod cli;
            pub mod console;
            pub mod presenter;
        }
        pub mod secondary {
            pub mod credentials;
            pub mod external_apis {
                pub mod github;
            }
        }
    }
    pub mod telemetry;
}

#[cfg(test)]
mod testing;
