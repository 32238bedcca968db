pub mod billtrack_testkit;
