pub mod local_controller;
