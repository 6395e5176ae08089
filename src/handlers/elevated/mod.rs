// handlers/elevated/mod.rs - Elevated handlers (admin bearer token required)
//
// Route Prefix: /api/admin/*
// Middleware: admin_auth_middleware (token verification + admin role)

pub mod users;
